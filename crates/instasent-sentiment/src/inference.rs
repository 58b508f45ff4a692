//! Client for Hugging Face Inference API compatible classification endpoints.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::error::SentimentError;
use crate::types::Prediction;

/// Inference HTTP client.
///
/// One instance serves every model on the same endpoint; the model id is
/// part of the request path (`POST {base}/models/{model}`).
pub struct InferenceClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct TextRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// Classification endpoints answer with a flat list for images and a list
/// per input for text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassificationResponse {
    Flat(Vec<LabelScore>),
    Nested(Vec<Vec<LabelScore>>),
}

impl InferenceClient {
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        token: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, SentimentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: token.map(str::to_owned),
        })
    }

    /// Classifies `text` with `model` and returns the top prediction.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Inference`] on transport failure, non-2xx
    /// status, an unparseable body, or an empty result.
    pub async fn classify_text(
        &self,
        model: &str,
        text: &str,
    ) -> Result<Prediction, SentimentError> {
        let request = self
            .client
            .post(self.model_url(model))
            .json(&TextRequest { inputs: text });
        self.send(request, model).await
    }

    /// Classifies raw image bytes with `model` and returns the top prediction.
    ///
    /// # Errors
    ///
    /// Same as [`Self::classify_text`].
    pub async fn classify_image(
        &self,
        model: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<Prediction, SentimentError> {
        let request = self
            .client
            .post(self.model_url(model))
            .header(CONTENT_TYPE, mime_type)
            .body(bytes.to_vec());
        self.send(request, model).await
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/models/{model}", self.base_url)
    }

    async fn send(
        &self,
        mut request: reqwest::RequestBuilder,
        model: &str,
    ) -> Result<Prediction, SentimentError> {
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| SentimentError::Inference(format!("{model}: request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SentimentError::Inference(format!("{model}: reading body failed: {e}")))?;

        if !status.is_success() {
            let excerpt: String = body.chars().take(200).collect();
            return Err(SentimentError::Inference(format!(
                "{model}: returned status {status}: {excerpt}"
            )));
        }

        top_prediction(&body)
            .map_err(|reason| SentimentError::Inference(format!("{model}: {reason}")))
    }
}

/// Picks the highest-scoring label from a classification response body.
fn top_prediction(body: &str) -> Result<Prediction, String> {
    let parsed: ClassificationResponse =
        serde_json::from_str(body).map_err(|e| format!("response parse error: {e}"))?;

    let labels = match parsed {
        ClassificationResponse::Flat(labels) => labels,
        ClassificationResponse::Nested(batches) => batches.into_iter().flatten().collect(),
    };

    labels
        .into_iter()
        .filter(|l| l.score.is_finite())
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .map(|top| Prediction {
            label: top.label,
            score: top.score.clamp(0.0, 1.0),
        })
        .ok_or_else(|| "response contained no labels".to_owned())
}
