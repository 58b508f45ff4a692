//! Text and image scorers.
//!
//! The pipeline only sees the [`TextScorer`] and [`ImageScorer`] traits.
//! Remote backends wrap an [`InferenceClient`]; [`LexiconTextScorer`] scores
//! captions offline from a fixed word list.

use std::sync::Arc;

use async_trait::async_trait;

use instasent_core::{AppConfig, TextBackend};

use crate::error::SentimentError;
use crate::image::PostImage;
use crate::inference::InferenceClient;
use crate::types::Prediction;

#[async_trait]
pub trait TextScorer: Send + Sync {
    async fn score_text(&self, text: &str) -> Result<Prediction, SentimentError>;
}

#[async_trait]
pub trait ImageScorer: Send + Sync {
    async fn score_image(&self, image: &PostImage) -> Result<Prediction, SentimentError>;
}

pub struct InferenceTextScorer {
    client: Arc<InferenceClient>,
    model: String,
}

impl InferenceTextScorer {
    #[must_use]
    pub fn new(client: Arc<InferenceClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl TextScorer for InferenceTextScorer {
    async fn score_text(&self, text: &str) -> Result<Prediction, SentimentError> {
        self.client.classify_text(&self.model, text).await
    }
}

pub struct InferenceImageScorer {
    client: Arc<InferenceClient>,
    model: String,
}

impl InferenceImageScorer {
    #[must_use]
    pub fn new(client: Arc<InferenceClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ImageScorer for InferenceImageScorer {
    async fn score_image(&self, image: &PostImage) -> Result<Prediction, SentimentError> {
        self.client
            .classify_image(&self.model, image.bytes(), image.mime_type())
            .await
    }
}

/// The scorer pair used by every analysis, built once at startup.
#[derive(Clone)]
pub struct Scorers {
    pub text: Arc<dyn TextScorer>,
    pub image: Arc<dyn ImageScorer>,
}

impl Scorers {
    /// Builds the configured backends.
    ///
    /// Images are always classified remotely; captions use the inference
    /// endpoint or the offline lexicon depending on `text_backend`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the inference HTTP client cannot
    /// be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, SentimentError> {
        let client = Arc::new(InferenceClient::new(
            &config.inference_url,
            config.inference_token.as_deref(),
            config.inference_timeout_secs,
        )?);

        let text: Arc<dyn TextScorer> = match config.text_backend {
            TextBackend::Inference => Arc::new(InferenceTextScorer::new(
                Arc::clone(&client),
                config.text_model.clone(),
            )),
            TextBackend::Lexicon => Arc::new(LexiconTextScorer),
        };
        let image: Arc<dyn ImageScorer> =
            Arc::new(InferenceImageScorer::new(client, config.image_model.clone()));

        tracing::info!(
            text_backend = %config.text_backend,
            text_model = %config.text_model,
            image_model = %config.image_model,
            inference_url = %config.inference_url,
            "scorers initialised"
        );
        Ok(Self { text, image })
    }
}

/// General-purpose word weights.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Positive
    ("amazing", 0.5),
    ("awesome", 0.5),
    ("beautiful", 0.5),
    ("best", 0.5),
    ("blessed", 0.4),
    ("excellent", 0.5),
    ("excited", 0.4),
    ("fantastic", 0.5),
    ("fun", 0.3),
    ("good", 0.3),
    ("gorgeous", 0.5),
    ("grateful", 0.4),
    ("great", 0.4),
    ("happy", 0.4),
    ("incredible", 0.5),
    ("love", 0.5),
    ("loved", 0.5),
    ("lovely", 0.4),
    ("nice", 0.3),
    ("perfect", 0.5),
    ("proud", 0.4),
    ("recommend", 0.4),
    ("thanks", 0.3),
    ("wonderful", 0.5),
    ("win", 0.4),
    // Negative
    ("angry", -0.5),
    ("awful", -0.6),
    ("bad", -0.4),
    ("boring", -0.3),
    ("broken", -0.4),
    ("disappointed", -0.5),
    ("disappointing", -0.5),
    ("hate", -0.6),
    ("horrible", -0.6),
    ("never", -0.2),
    ("poor", -0.4),
    ("problem", -0.3),
    ("sad", -0.4),
    ("scam", -0.7),
    ("sorry", -0.3),
    ("terrible", -0.6),
    ("ugly", -0.5),
    ("upset", -0.4),
    ("waste", -0.5),
    ("worst", -0.6),
];

/// Scores `text` against [`LEXICON`].
///
/// Splits text into lowercase words, sums matching weights, and clamps
/// the result to `[-1.0, 1.0]`. Returns `0.0` for empty or unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let mut score = 0.0_f32;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        if let Some(&(_, weight)) = LEXICON.iter().find(|(lex_word, _)| *lex_word == w) {
            score += weight;
        }
    }
    score.clamp(-1.0, 1.0)
}

/// Offline [`TextScorer`] backed by [`lexicon_score`].
///
/// Label is `positive`, `negative` or `neutral` by the sign of the raw
/// score; confidence is `0.5 + |raw| / 2`, so neutral text scores 0.5.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconTextScorer;

impl LexiconTextScorer {
    #[must_use]
    pub fn predict(text: &str) -> Prediction {
        let raw = lexicon_score(text);
        let label = if raw > 0.0 {
            "positive"
        } else if raw < 0.0 {
            "negative"
        } else {
            "neutral"
        };
        Prediction {
            label: label.to_owned(),
            score: 0.5 + f64::from(raw.abs()) / 2.0,
        }
    }
}

#[async_trait]
impl TextScorer for LexiconTextScorer {
    async fn score_text(&self, text: &str) -> Result<Prediction, SentimentError> {
        Ok(Self::predict(text))
    }
}
