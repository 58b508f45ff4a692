//! HTTP session against Instagram's web endpoints.

mod login;
mod profile;

use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use instasent_core::AppConfig;

use crate::error::ScraperError;
use crate::retry::{with_retry, RetryPolicy};

/// Settings for [`InstagramClient::new`].
#[derive(Debug, Clone)]
pub struct InstagramClientConfig {
    pub base_url: String,
    /// Value sent as `X-IG-App-ID`; the web endpoints reject requests without it.
    pub app_id: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub retry: RetryPolicy,
}

impl InstagramClientConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.instagram_base_url.clone(),
            app_id: config.instagram_app_id.clone(),
            timeout_secs: config.scraper_request_timeout_secs,
            user_agent: config.scraper_user_agent.clone(),
            retry: RetryPolicy::new(
                config.scraper_max_attempts,
                Duration::from_secs(config.scraper_rate_limit_delay_secs),
            ),
        }
    }
}

/// An Instagram web session.
///
/// Built once at process start, optionally logged in with [`Self::login`],
/// then shared read-only by every analysis. The cookie store carries the
/// session cookies between requests.
pub struct InstagramClient {
    client: Client,
    base_url: Url,
    app_id: String,
    retry: RetryPolicy,
    session_user: Option<String>,
}

impl InstagramClient {
    /// Creates an anonymous session.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ScraperError::InvalidUrl`] if `base_url`
    /// does not parse.
    pub fn new(config: &InstagramClientConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", config.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ScraperError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            app_id: config.app_id.clone(),
            retry: config.retry,
            session_user: None,
        })
    }

    /// Builds the process-wide session from configuration and logs in when
    /// credentials are set.
    ///
    /// A failed or skipped login is logged and the session stays anonymous;
    /// public profiles remain readable without it.
    ///
    /// # Errors
    ///
    /// Only construction errors from [`Self::new`] are returned.
    pub async fn connect(config: &AppConfig) -> Result<Self, ScraperError> {
        let mut client = Self::new(&InstagramClientConfig::from_app_config(config))?;
        match config.instagram_credentials() {
            Some((username, password)) => {
                if let Err(e) = client.login(username, password).await {
                    tracing::warn!(
                        username,
                        error = %e,
                        "instagram login failed; continuing with an anonymous session"
                    );
                }
            }
            None => tracing::warn!(
                "INSTAGRAM_USERNAME/INSTAGRAM_PASSWORD not set; using an anonymous session"
            ),
        }
        Ok(client)
    }

    /// Username this session is logged in as, if any.
    #[must_use]
    pub fn session_user(&self) -> Option<&str> {
        self.session_user.as_deref()
    }

    fn endpoint(&self, path: &str) -> Result<Url, ScraperError> {
        self.base_url
            .join(path)
            .map_err(|e| ScraperError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })
    }

    /// GETs `url` and parses the body as `T`, retrying per the session's
    /// [`RetryPolicy`].
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, ScraperError> {
        with_retry(self.retry, || self.get_json_once(url, context)).await
    }

    async fn get_json_once<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, ScraperError> {
        let response = self
            .client
            .get(url.clone())
            .header("X-IG-App-ID", &self.app_id)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(reqwest::header::ACCEPT, "*/*")
            .header(reqwest::header::REFERER, self.base_url.as_str())
            .send()
            .await?;
        check_status(&response, url)?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::debug!(
                context,
                body = %body.chars().take(200).collect::<String>(),
                "response body is not the expected JSON"
            );
            ScraperError::Deserialize {
                context: context.to_owned(),
                source: e,
            }
        })
    }
}

/// Maps non-2xx statuses onto typed errors.
fn check_status(response: &Response, url: &Url) -> Result<(), ScraperError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(ScraperError::RateLimited { retry_after_secs });
    }

    let url = url.to_string();
    Err(match status {
        StatusCode::NOT_FOUND => ScraperError::NotFound { url },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ScraperError::Unauthorized {
            status: status.as_u16(),
            url,
        },
        _ => ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url,
        },
    })
}
