//! HTML form and report pages.

use std::fmt::Write as _;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;

use instasent_sentiment::AnalysisResult;

use crate::api::{AppState, PostCountLimits};

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
    <head>
        <meta charset="utf-8">
        <title>Instagram Sentiment Analysis</title>
    </head>
    <body>
        <h1>Instagram Sentiment Analysis</h1>
        <form action="/analyze" method="post">
            <label for="username">Instagram Username:</label>
            <input type="text" id="username" name="username" required>
            <br><br>
            <label for="num_posts">Number of Posts to Analyze:</label>
            <input type="number" id="num_posts" name="num_posts" value="5" min="1" max="20">
            <br><br>
            <button type="submit">Analyze</button>
        </form>
    </body>
</html>
"#;

const ANALYSIS_FAILED: &str = "Analysis could not be performed. Please try again later.";

#[derive(Debug, Deserialize)]
pub(crate) struct AnalyzeForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    num_posts: Option<String>,
}

/// `GET /`
pub(crate) async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `POST /analyze`
pub(crate) async fn analyze_form(
    State(state): State<AppState>,
    Form(form): Form<AnalyzeForm>,
) -> Response {
    let username = form.username.trim();
    if username.is_empty() {
        return error_page(
            StatusCode::BAD_REQUEST,
            "Username is required. Please go back and enter a username.",
        );
    }

    let post_count = match parse_post_count(form.num_posts.as_deref(), state.posts) {
        Ok(n) => n,
        Err(message) => return error_page(StatusCode::BAD_REQUEST, &message),
    };

    match state.analyzer.analyze(username, post_count).await {
        Ok(result) => Html(render_report(&result)).into_response(),
        Err(e) => {
            tracing::error!(username, error = %e, "analysis failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(page("Error", &format!("<h1>{ANALYSIS_FAILED}</h1>"))),
            )
                .into_response()
        }
    }
}

/// Blank or absent selects the default; anything else must be an integer
/// and is clamped into the allowed range.
fn parse_post_count(raw: Option<&str>, limits: PostCountLimits) -> Result<usize, String> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let requested = raw
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| format!("Number of posts must be a whole number, got \"{s}\"."))
        })
        .transpose()?;
    Ok(limits.normalize(requested))
}

fn error_page(status: StatusCode, message: &str) -> Response {
    let body = format!("<h1>Error</h1>\n<p>{}</p>", escape_html(message));
    (status, Html(page("Error", &body))).into_response()
}

/// 429 page for a form submission turned away by the analysis throttle.
pub(crate) fn too_many_analyses_page(retry_after_secs: u64) -> Response {
    error_page(
        StatusCode::TOO_MANY_REQUESTS,
        &format!("Too many analyses are running. Please try again in {retry_after_secs} seconds."),
    )
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{body}\n<p><a href=\"/\">Analyze another profile</a></p>\n</body>\n</html>\n",
        escape_html(title)
    )
}

pub(crate) fn render_report(result: &AnalysisResult) -> String {
    let username = escape_html(&result.username);
    let mut body = String::new();

    let _ = writeln!(body, "<h1>Sentiment Analysis Results for @{username}</h1>");
    if let Some(error) = &result.error {
        let _ = writeln!(body, "<p><b>Error:</b> {}</p>", escape_html(error));
    }
    let _ = writeln!(
        body,
        "<p><b>Overall Caption Sentiment:</b> {:.2}</p>",
        result.overall_caption_sentiment
    );
    let _ = writeln!(
        body,
        "<p><b>Overall Image Sentiment:</b> {:.2}</p>",
        result.overall_image_sentiment
    );
    let _ = writeln!(
        body,
        "<p><b>Overall Likes Engagement Sentiment:</b> {:.2}</p>",
        result.overall_engagement_sentiment
    );
    let _ = writeln!(
        body,
        "<p><b>Total Followers:</b> {}</p>",
        format_thousands(result.overall_followers_sentiment)
    );

    body.push_str("<h2>Caption Sentiments:</h2>\n<ul>\n");
    for caption in &result.caption_sentiments {
        let _ = writeln!(
            body,
            "<li>{} - {} (Score: {:.2})</li>",
            escape_html(&caption.text),
            escape_html(&caption.label),
            caption.score
        );
    }
    body.push_str("</ul>\n<h2>Image Sentiments:</h2>\n<ul>\n");
    for image in &result.image_sentiments {
        let _ = writeln!(
            body,
            "<li><img src=\"{}\" alt=\"Post Image\" width=\"100\"> - {} (Score: {:.2})</li>",
            escape_html(&image.url),
            escape_html(&image.label),
            image.score
        );
    }
    body.push_str("</ul>");

    page(&format!("@{} sentiment", result.username), &body)
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// `1234567` → `"1,234,567"`.
fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
