use instasent_scraper::ScraperError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("inference error: {0}")]
    Inference(String),

    #[error("image decode error: {0}")]
    ImageDecode(String),

    #[error("profile source error: {0}")]
    Source(#[from] ScraperError),
}
