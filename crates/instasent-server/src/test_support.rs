//! In-memory collaborators for route tests.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::Router;

use instasent_scraper::{ImageFetcher, Post, PostPage, Profile, ProfileSource, ScraperError};
use instasent_sentiment::{
    Analyzer, ImageScorer, PostImage, Prediction, Scorers, SentimentError, TextScorer,
};

use crate::api::{build_app, AppState, PostCountLimits};
use crate::middleware::AnalysisThrottle;

/// Knows one profile, `demo`, with three posts.
struct DemoSource;

fn demo_posts() -> Vec<Post> {
    vec![
        Post {
            shortcode: Some("A1".to_owned()),
            caption: Some("Great product!".to_owned()),
            image_url: Some("https://cdn.example.com/a.jpg?x=1&y=2".to_owned()),
            like_count: 100,
        },
        Post {
            shortcode: Some("B2".to_owned()),
            caption: Some(String::new()),
            image_url: Some("https://cdn.example.com/b.jpg".to_owned()),
            like_count: 50,
        },
        Post {
            shortcode: Some("C3".to_owned()),
            caption: Some("<script>alert('x')</script> & more".to_owned()),
            image_url: Some("https://cdn.example.com/missing.jpg".to_owned()),
            like_count: 30,
        },
    ]
}

#[async_trait]
impl ProfileSource for DemoSource {
    async fn lookup_profile(&self, username: &str) -> Result<Profile, ScraperError> {
        if username != "demo" {
            return Err(ScraperError::ProfileNotFound {
                username: username.to_owned(),
            });
        }
        Ok(Profile {
            user_id: "1".to_owned(),
            username: "demo".to_owned(),
            follower_count: 1_234_567,
            is_private: false,
        })
    }

    async fn fetch_posts_page(
        &self,
        _profile: &Profile,
        _cursor: Option<&str>,
    ) -> Result<PostPage, ScraperError> {
        Ok(PostPage {
            posts: demo_posts(),
            next_cursor: None,
        })
    }
}

/// Serves a tiny PNG for every URL except those containing `missing`.
struct PngFetcher;

#[async_trait]
impl ImageFetcher for PngFetcher {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ScraperError> {
        if url.contains("missing") {
            return Err(ScraperError::NotFound {
                url: url.to_owned(),
            });
        }
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb([0, 128, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .expect("encode png");
        Ok(out.into_inner())
    }
}

struct FixedText {
    fail: bool,
}

#[async_trait]
impl TextScorer for FixedText {
    async fn score_text(&self, _text: &str) -> Result<Prediction, SentimentError> {
        if self.fail {
            return Err(SentimentError::Inference("model unavailable".to_owned()));
        }
        Ok(Prediction {
            label: "5 stars".to_owned(),
            score: 0.9,
        })
    }
}

struct FixedImage;

#[async_trait]
impl ImageScorer for FixedImage {
    async fn score_image(&self, _image: &PostImage) -> Result<Prediction, SentimentError> {
        Ok(Prediction {
            label: "X".to_owned(),
            score: 0.8,
        })
    }
}

fn app_with_text(fail: bool, throttle: AnalysisThrottle) -> Router {
    let analyzer = Analyzer::new(
        Arc::new(DemoSource),
        Arc::new(PngFetcher),
        Scorers {
            text: Arc::new(FixedText { fail }),
            image: Arc::new(FixedImage),
        },
    );
    build_app(
        AppState {
            analyzer,
            posts: PostCountLimits { default: 5, max: 20 },
        },
        throttle,
    )
}

pub(crate) fn test_app() -> Router {
    app_with_text(false, AnalysisThrottle::per_minute(1_000))
}

pub(crate) fn throttled_app(per_minute: usize) -> Router {
    app_with_text(false, AnalysisThrottle::per_minute(per_minute))
}

/// Caption scoring always fails, so any analysis of `demo` errors.
pub(crate) fn failing_app() -> Router {
    app_with_text(true, AnalysisThrottle::per_minute(1_000))
}

pub(crate) fn request(
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: Body,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    builder.body(body).expect("request")
}
