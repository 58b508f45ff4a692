use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which implementation scores caption text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBackend {
    /// Hosted pretrained model behind the inference endpoint.
    Inference,
    /// Offline word-weight lexicon; no network calls.
    Lexicon,
}

impl std::fmt::Display for TextBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextBackend::Inference => write!(f, "inference"),
            TextBackend::Lexicon => write!(f, "lexicon"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub instagram_username: Option<String>,
    pub instagram_password: Option<String>,
    pub instagram_base_url: String,
    pub instagram_app_id: String,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_max_attempts: u32,
    pub scraper_rate_limit_delay_secs: u64,
    pub inference_url: String,
    pub inference_token: Option<String>,
    pub inference_timeout_secs: u64,
    pub text_model: String,
    pub image_model: String,
    pub text_backend: TextBackend,
    pub default_post_count: usize,
    pub max_post_count: usize,
    pub rate_limit_per_minute: usize,
}

impl AppConfig {
    /// Returns the Instagram credential pair when both halves are configured.
    #[must_use]
    pub fn instagram_credentials(&self) -> Option<(&str, &str)> {
        match (&self.instagram_username, &self.instagram_password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("instagram_username", &self.instagram_username)
            .field(
                "instagram_password",
                &self.instagram_password.as_ref().map(|_| "[redacted]"),
            )
            .field("instagram_base_url", &self.instagram_base_url)
            .field("instagram_app_id", &self.instagram_app_id)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("scraper_max_attempts", &self.scraper_max_attempts)
            .field(
                "scraper_rate_limit_delay_secs",
                &self.scraper_rate_limit_delay_secs,
            )
            .field("inference_url", &self.inference_url)
            .field(
                "inference_token",
                &self.inference_token.as_ref().map(|_| "[redacted]"),
            )
            .field("inference_timeout_secs", &self.inference_timeout_secs)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("text_backend", &self.text_backend)
            .field("default_post_count", &self.default_post_count)
            .field("max_post_count", &self.max_post_count)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}
