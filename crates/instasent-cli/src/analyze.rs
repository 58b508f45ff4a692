//! `analyze` command handler.

use std::sync::Arc;

use instasent_core::AppConfig;
use instasent_scraper::{HttpImageFetcher, InstagramClient};
use instasent_sentiment::{AnalysisResult, Analyzer, Scorers};

/// Runs one analysis and prints it to stdout.
///
/// # Errors
///
/// Returns an error if a client cannot be built, the analysis fails, or the
/// profile does not exist (after printing the zeroed report).
pub(crate) async fn run_analyze(
    config: &AppConfig,
    username: &str,
    posts: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let username = normalize_username(username);
    if username.is_empty() {
        anyhow::bail!("username is required");
    }
    let post_count = posts.unwrap_or(config.default_post_count);

    let session = InstagramClient::connect(config).await?;
    let images =
        HttpImageFetcher::new(config.scraper_request_timeout_secs, &config.scraper_user_agent)?;
    let scorers = Scorers::from_app_config(config)?;
    let analyzer = Analyzer::new(Arc::new(session), Arc::new(images), scorers);

    let result = analyzer.analyze(username, post_count).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", format_report(&result));
    }

    if result.is_profile_not_found() {
        anyhow::bail!("profile '{username}' not found");
    }
    Ok(())
}

fn normalize_username(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed.strip_prefix('@').unwrap_or(trimmed)
}

fn format_report(result: &AnalysisResult) -> String {
    let mut out = format!("Sentiment analysis for @{}\n", result.username);
    if let Some(error) = &result.error {
        out.push_str(&format!("error: {error}\n"));
    }
    out.push_str(&format!(
        "{:<34}{:.2}\n{:<34}{:.2}\n{:<34}{:.2}\n{:<34}{}\n",
        "Overall caption sentiment:",
        result.overall_caption_sentiment,
        "Overall image sentiment:",
        result.overall_image_sentiment,
        "Overall likes engagement:",
        result.overall_engagement_sentiment,
        "Total followers:",
        result.overall_followers_sentiment,
    ));

    if !result.caption_sentiments.is_empty() {
        out.push_str(&format!("\n{:<12}{:<8}CAPTION\n", "LABEL", "SCORE"));
        for caption in &result.caption_sentiments {
            out.push_str(&format!(
                "{:<12}{:<8.2}{}\n",
                caption.label,
                caption.score,
                single_line(&caption.text)
            ));
        }
    }
    if !result.image_sentiments.is_empty() {
        out.push_str(&format!("\n{:<24}{:<8}URL\n", "LABEL", "SCORE"));
        for image in &result.image_sentiments {
            out.push_str(&format!(
                "{:<24}{:<8.2}{}\n",
                image.label, image.score, image.url
            ));
        }
    }
    out
}

/// Captions often span lines; keep one row per record.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
