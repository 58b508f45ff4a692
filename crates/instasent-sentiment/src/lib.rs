//! Sentiment scoring for Instagram profiles.
//!
//! Scores each recent post's caption and image with pretrained classifiers
//! behind the [`TextScorer`] and [`ImageScorer`] traits, then averages the
//! per-post scores into an [`AnalysisResult`].

pub mod error;
pub mod image;
pub mod inference;
pub mod pipeline;
pub mod scorer;
pub mod types;

pub use error::SentimentError;
pub use crate::image::PostImage;
pub use inference::InferenceClient;
pub use pipeline::Analyzer;
pub use scorer::{
    lexicon_score, ImageScorer, InferenceImageScorer, InferenceTextScorer, LexiconTextScorer,
    Scorers, TextScorer,
};
pub use types::{
    AnalysisResult, CaptionSentiment, Engagement, ImageSentiment, Prediction, PROFILE_NOT_FOUND,
};
