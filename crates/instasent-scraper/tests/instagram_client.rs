//! Integration tests for `InstagramClient` against a local `wiremock` server.
//!
//! Covers login, profile resolution, feed paging, status mapping, and the
//! retry behaviour on rate limits and malformed bodies.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use instasent_scraper::{
    InstagramClient, InstagramClientConfig, PostStream, ProfileSource, RetryPolicy, ScraperError,
};

fn test_client(base_url: &str, retry: RetryPolicy) -> InstagramClient {
    InstagramClient::new(&InstagramClientConfig {
        base_url: base_url.to_owned(),
        app_id: "936619743392459".to_owned(),
        timeout_secs: 5,
        user_agent: "instasent-test/0.1".to_owned(),
        retry,
    })
    .expect("failed to build test InstagramClient")
}

fn profile_json(username: &str, followers: u64, is_private: bool) -> serde_json::Value {
    json!({
        "data": {
            "user": {
                "id": "314159",
                "username": username,
                "edge_followed_by": { "count": followers },
                "is_private": is_private,
                "followed_by_viewer": false,
                "full_name": "ignored"
            }
        },
        "status": "ok"
    })
}

fn feed_json(captions: &[&str], next_max_id: Option<&str>) -> serde_json::Value {
    let items: Vec<_> = captions
        .iter()
        .enumerate()
        .map(|(i, c)| {
            json!({
                "code": format!("C{i}"),
                "caption": { "text": c },
                "like_count": 10 * (i + 1),
                "image_versions2": {
                    "candidates": [ { "url": format!("https://cdn.example.com/{i}.jpg") } ]
                }
            })
        })
        .collect();
    json!({
        "items": items,
        "more_available": next_max_id.is_some(),
        "next_max_id": next_max_id,
        "status": "ok"
    })
}

async fn mount_profile(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/v1/users/web_profile_info/"))
        .and(query_param("username", "natgeo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Profile lookup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lookup_profile_resolves_user_and_follower_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/web_profile_info/"))
        .and(query_param("username", "natgeo"))
        .and(header("X-IG-App-ID", "936619743392459"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json("natgeo", 1234, false)))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), RetryPolicy::single_attempt());
    let profile = client.lookup_profile("natgeo").await.unwrap();

    assert_eq!(profile.user_id, "314159");
    assert_eq!(profile.username, "natgeo");
    assert_eq!(profile.follower_count, 1234);
    assert!(!profile.is_private);
}

#[tokio::test]
async fn lookup_profile_maps_404_to_profile_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/web_profile_info/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), RetryPolicy::new(5, Duration::ZERO));
    let result = client.lookup_profile("ghost").await;

    assert!(
        matches!(result, Err(ScraperError::ProfileNotFound { ref username }) if username == "ghost"),
        "expected ProfileNotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn lookup_profile_maps_null_user_to_profile_not_found() {
    let server = MockServer::start().await;
    mount_profile(&server, json!({ "data": { "user": null }, "status": "ok" })).await;

    let client = test_client(&server.uri(), RetryPolicy::single_attempt());
    let result = client.lookup_profile("natgeo").await;

    assert!(matches!(result, Err(ScraperError::ProfileNotFound { .. })));
}

#[tokio::test]
async fn lookup_profile_rejects_private_profile_not_followed() {
    let server = MockServer::start().await;
    mount_profile(&server, profile_json("natgeo", 5, true)).await;

    let client = test_client(&server.uri(), RetryPolicy::single_attempt());
    let result = client.lookup_profile("natgeo").await;

    assert!(matches!(result, Err(ScraperError::PrivateProfile { .. })));
}

#[tokio::test]
async fn lookup_profile_retries_after_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/web_profile_info/"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_profile(&server, profile_json("natgeo", 99, false)).await;

    let client = test_client(&server.uri(), RetryPolicy::new(5, Duration::ZERO));
    let profile = client.lookup_profile("natgeo").await.unwrap();

    assert_eq!(profile.follower_count, 99);
}

#[tokio::test]
async fn lookup_profile_gives_up_after_max_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/web_profile_info/"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), RetryPolicy::new(3, Duration::ZERO));
    let result = client.lookup_profile("natgeo").await;

    assert!(
        matches!(result, Err(ScraperError::RateLimited { retry_after_secs: 60 })),
        "missing Retry-After should default to 60s, got: {result:?}"
    );
}

#[tokio::test]
async fn lookup_profile_retries_html_interstitial_as_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/web_profile_info/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_profile(&server, profile_json("natgeo", 7, false)).await;

    let client = test_client(&server.uri(), RetryPolicy::new(2, Duration::ZERO));
    let profile = client.lookup_profile("natgeo").await.unwrap();

    assert_eq!(profile.follower_count, 7);
}

#[tokio::test]
async fn lookup_profile_maps_403_to_unauthorized_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/web_profile_info/"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), RetryPolicy::new(5, Duration::ZERO));
    let result = client.lookup_profile("natgeo").await;

    assert!(matches!(
        result,
        Err(ScraperError::Unauthorized { status: 403, .. })
    ));
}

// ---------------------------------------------------------------------------
// Feed paging
// ---------------------------------------------------------------------------

#[tokio::test]
async fn post_stream_follows_max_id_cursor() {
    let server = MockServer::start().await;
    mount_profile(&server, profile_json("natgeo", 1, false)).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/feed/user/314159/"))
        .and(query_param("max_id", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_json(&["third"], None)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/feed/user/314159/"))
        .and(query_param("count", "12"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(feed_json(&["first", "second"], Some("page2"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), RetryPolicy::single_attempt());
    let profile = client.lookup_profile("natgeo").await.unwrap();
    let mut stream = PostStream::new(&client, &profile);

    let mut captions = Vec::new();
    while let Some(post) = stream.next_post().await.unwrap() {
        captions.push(post.caption.unwrap_or_default());
    }
    assert_eq!(captions, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn feed_page_carries_likes_and_image_url() {
    let server = MockServer::start().await;
    mount_profile(&server, profile_json("natgeo", 1, false)).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/feed/user/314159/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_json(&["hello"], None)))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), RetryPolicy::single_attempt());
    let source: &dyn ProfileSource = &client;
    let profile = source.lookup_profile("natgeo").await.unwrap();
    let page = source.fetch_posts_page(&profile, None).await.unwrap();

    assert_eq!(page.posts.len(), 1);
    assert_eq!(page.posts[0].like_count, 10);
    assert_eq!(
        page.posts[0].image_url.as_deref(),
        Some("https://cdn.example.com/0.jpg")
    );
    assert_eq!(page.next_cursor, None);
}

#[tokio::test]
async fn feed_page_5xx_surfaces_after_retries() {
    let server = MockServer::start().await;
    mount_profile(&server, profile_json("natgeo", 1, false)).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/feed/user/314159/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), RetryPolicy::new(2, Duration::ZERO));
    let profile = client.lookup_profile("natgeo").await.unwrap();
    let result = client.fetch_posts_page(&profile, None).await;

    assert!(matches!(
        result,
        Err(ScraperError::UnexpectedStatus { status: 503, .. })
    ));
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

async fn mount_login_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/accounts/login/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "csrftoken=tok123; Path=/")
                .set_body_string("<html></html>"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_sends_csrf_token_and_records_session_user() {
    let server = MockServer::start().await;
    mount_login_page(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/web/accounts/login/ajax/"))
        .and(header("X-CSRFToken", "tok123"))
        .and(body_string_contains("username=me"))
        .and(body_string_contains("PWD_INSTAGRAM_BROWSER"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": true,
            "authenticated": true,
            "status": "ok"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = test_client(&server.uri(), RetryPolicy::single_attempt());
    client.login("me", "secret").await.unwrap();

    assert_eq!(client.session_user(), Some("me"));
}

#[tokio::test]
async fn login_rejected_credentials_return_login_failed() {
    let server = MockServer::start().await;
    mount_login_page(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/web/accounts/login/ajax/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "checkpoint_required",
            "status": "fail"
        })))
        .mount(&server)
        .await;

    let mut client = test_client(&server.uri(), RetryPolicy::single_attempt());
    let result = client.login("me", "wrong").await;

    assert!(
        matches!(result, Err(ScraperError::LoginFailed(ref reason)) if reason == "checkpoint_required"),
        "got: {result:?}"
    );
    assert_eq!(client.session_user(), None);
}

#[tokio::test]
async fn login_without_csrf_cookie_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accounts/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let mut client = test_client(&server.uri(), RetryPolicy::single_attempt());
    let result = client.login("me", "secret").await;

    assert!(matches!(result, Err(ScraperError::LoginFailed(_))));
}
