use serde::{Deserialize, Serialize};

/// Marker placed in [`AnalysisResult::error`] when the username cannot be
/// resolved.
pub const PROFILE_NOT_FOUND: &str = "Profile not found";

/// Top class returned by a scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    /// Confidence in `[0.0, 1.0]`.
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionSentiment {
    /// Caption exactly as published.
    pub text: String,
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSentiment {
    pub url: String,
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: u64,
}

/// Outcome of one profile analysis.
///
/// Each record list holds at most as many entries as the post limit the
/// analysis ran with. Means over empty lists are `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Mean caption confidence.
    pub overall_caption_sentiment: f64,
    /// Mean image confidence.
    pub overall_image_sentiment: f64,
    /// Mean like count.
    pub overall_engagement_sentiment: f64,
    /// Follower count of the profile.
    pub overall_followers_sentiment: u64,
    pub caption_sentiments: Vec<CaptionSentiment>,
    pub image_sentiments: Vec<ImageSentiment>,
    pub engagement_sentiments: Vec<Engagement>,
}

impl AnalysisResult {
    /// Result for a username that could not be resolved: error marker set,
    /// every summary zero, every list empty.
    #[must_use]
    pub fn profile_not_found(username: &str) -> Self {
        Self {
            username: username.to_owned(),
            error: Some(PROFILE_NOT_FOUND.to_owned()),
            overall_caption_sentiment: 0.0,
            overall_image_sentiment: 0.0,
            overall_engagement_sentiment: 0.0,
            overall_followers_sentiment: 0,
            caption_sentiments: Vec::new(),
            image_sentiments: Vec::new(),
            engagement_sentiments: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_profile_not_found(&self) -> bool {
        self.error.is_some()
    }
}
