//! Profile analysis orchestration.

use std::sync::Arc;

use instasent_scraper::{ImageFetcher, PostStream, ProfileSource};

use crate::error::SentimentError;
use crate::image::PostImage;
use crate::scorer::Scorers;
use crate::types::{AnalysisResult, CaptionSentiment, Engagement, ImageSentiment, Prediction};

/// Runs analyses against a shared profile source, image fetcher and scorer
/// pair. Cheap to clone; every collaborator is behind an `Arc`.
#[derive(Clone)]
pub struct Analyzer {
    source: Arc<dyn ProfileSource>,
    images: Arc<dyn ImageFetcher>,
    scorers: Scorers,
}

impl Analyzer {
    #[must_use]
    pub fn new(
        source: Arc<dyn ProfileSource>,
        images: Arc<dyn ImageFetcher>,
        scorers: Scorers,
    ) -> Self {
        Self {
            source,
            images,
            scorers,
        }
    }

    /// Analyses the `post_limit` most recent posts of `username`.
    ///
    /// 1. Resolve the profile. Any lookup failure yields
    ///    [`AnalysisResult::profile_not_found`] rather than an error.
    /// 2. Walk posts most-recent-first, requesting feed pages only as needed,
    ///    and stop after `post_limit` posts.
    /// 3. Per post: score a non-empty caption, classify the image (failures
    ///    logged and skipped), and record the like count.
    /// 4. Average each list; empty lists average to `0.0`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Source`] if a feed page fails after the
    /// profile resolved, or the text scorer's error if a caption cannot be
    /// scored.
    pub async fn analyze(
        &self,
        username: &str,
        post_limit: usize,
    ) -> Result<AnalysisResult, SentimentError> {
        tracing::info!(username, post_limit, "starting profile analysis");

        let profile = match self.source.lookup_profile(username).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(username, error = %e, "profile lookup failed");
                return Ok(AnalysisResult::profile_not_found(username));
            }
        };

        let mut captions: Vec<CaptionSentiment> = Vec::new();
        let mut images: Vec<ImageSentiment> = Vec::new();
        let mut engagement: Vec<Engagement> = Vec::new();

        let mut stream = PostStream::new(&*self.source, &profile);
        let mut processed = 0usize;
        while processed < post_limit {
            let Some(post) = stream.next_post().await? else {
                break;
            };

            if let Some(caption) = post.non_empty_caption() {
                let prediction = self.scorers.text.score_text(caption).await?;
                captions.push(CaptionSentiment {
                    text: caption.to_owned(),
                    label: prediction.label,
                    score: prediction.score,
                });
            }

            if let Some(url) = post.image_url.as_deref() {
                match self.classify_image(url).await {
                    Ok(prediction) => images.push(ImageSentiment {
                        url: url.to_owned(),
                        label: prediction.label,
                        score: prediction.score,
                    }),
                    Err(e) => {
                        tracing::warn!(url, error = %e, "failed to process post image");
                    }
                }
            }

            engagement.push(Engagement {
                likes: post.like_count,
            });
            processed += 1;
        }

        let caption_scores: Vec<f64> = captions.iter().map(|c| c.score).collect();
        let image_scores: Vec<f64> = images.iter().map(|i| i.score).collect();
        #[allow(clippy::cast_precision_loss)]
        let likes: Vec<f64> = engagement.iter().map(|e| e.likes as f64).collect();

        let result = AnalysisResult {
            username: profile.username.clone(),
            error: None,
            overall_caption_sentiment: mean(&caption_scores),
            overall_image_sentiment: mean(&image_scores),
            overall_engagement_sentiment: mean(&likes),
            overall_followers_sentiment: profile.follower_count,
            caption_sentiments: captions,
            image_sentiments: images,
            engagement_sentiments: engagement,
        };

        tracing::info!(
            username = %result.username,
            posts = processed,
            captions = result.caption_sentiments.len(),
            images = result.image_sentiments.len(),
            "profile analysis complete"
        );
        Ok(result)
    }

    /// Fetch, decode, classify.
    async fn classify_image(&self, url: &str) -> Result<Prediction, SentimentError> {
        let bytes = self.images.fetch_image(url).await?;
        let image = PostImage::decode(bytes)?;
        self.scorers.image.score_image(&image).await
    }
}

/// Arithmetic mean; `0.0` for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let denom = values.len() as f64;
        values.iter().sum::<f64>() / denom
    }
}
