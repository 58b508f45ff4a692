use crate::app_config::{AppConfig, Environment, TextBackend};
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default; Instagram credentials and the inference token
/// are optional and an empty value counts as unset.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("INSTASENT_ENV", "development"))?;

    let bind_addr = or_default("INSTASENT_BIND_ADDR", "127.0.0.1:5000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("INSTASENT_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("INSTASENT_LOG_LEVEL", "info");

    let instagram_username = optional("INSTAGRAM_USERNAME");
    let instagram_password = optional("INSTAGRAM_PASSWORD");
    let instagram_base_url = or_default("INSTASENT_INSTAGRAM_BASE_URL", "https://www.instagram.com")
        .trim_end_matches('/')
        .to_string();
    let instagram_app_id = or_default("INSTASENT_INSTAGRAM_APP_ID", "936619743392459");

    let scraper_request_timeout_secs = parse_u64("INSTASENT_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default("INSTASENT_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_max_attempts = parse_u32("INSTASENT_SCRAPER_MAX_ATTEMPTS", "5")?;
    if scraper_max_attempts == 0 {
        return Err(invalid(
            "INSTASENT_SCRAPER_MAX_ATTEMPTS",
            "must be at least 1".to_string(),
        ));
    }
    let scraper_rate_limit_delay_secs = parse_u64("INSTASENT_SCRAPER_RATE_LIMIT_DELAY_SECS", "60")?;

    let inference_url = or_default(
        "INSTASENT_INFERENCE_URL",
        "https://api-inference.huggingface.co",
    )
    .trim_end_matches('/')
    .to_string();
    let inference_token = optional("HF_API_TOKEN");
    let inference_timeout_secs = parse_u64("INSTASENT_INFERENCE_TIMEOUT_SECS", "60")?;
    let text_model = or_default(
        "INSTASENT_TEXT_MODEL",
        "nlptown/bert-base-multilingual-uncased-sentiment",
    );
    let image_model = or_default("INSTASENT_IMAGE_MODEL", "microsoft/resnet-50");
    let text_backend = parse_text_backend(&or_default("INSTASENT_TEXT_BACKEND", "inference"))?;

    let default_post_count = parse_usize("INSTASENT_DEFAULT_POST_COUNT", "5")?;
    let max_post_count = parse_usize("INSTASENT_MAX_POST_COUNT", "20")?;
    if max_post_count == 0 {
        return Err(invalid(
            "INSTASENT_MAX_POST_COUNT",
            "must be at least 1".to_string(),
        ));
    }
    let rate_limit_per_minute = parse_usize("INSTASENT_RATE_LIMIT_PER_MINUTE", "30")?;

    if env == Environment::Production {
        if instagram_username.is_none() || instagram_password.is_none() {
            return Err(invalid(
                "INSTAGRAM_USERNAME",
                "INSTAGRAM_USERNAME and INSTAGRAM_PASSWORD are required in production".to_string(),
            ));
        }
        if text_backend == TextBackend::Inference && inference_token.is_none() {
            return Err(invalid(
                "HF_API_TOKEN",
                "required in production when INSTASENT_TEXT_BACKEND=inference".to_string(),
            ));
        }
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        instagram_username,
        instagram_password,
        instagram_base_url,
        instagram_app_id,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_attempts,
        scraper_rate_limit_delay_secs,
        inference_url,
        inference_token,
        inference_timeout_secs,
        text_model,
        image_model,
        text_backend,
        default_post_count,
        max_post_count,
        rate_limit_per_minute,
    })
}

/// Parse `INSTASENT_ENV`.
///
/// Unknown values are rejected so a typo cannot switch off the production
/// requirements.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "development" | "dev" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" | "prod" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "INSTASENT_ENV".to_string(),
            reason: format!("expected `development`, `test` or `production`, got `{other}`"),
        }),
    }
}

fn parse_text_backend(s: &str) -> Result<TextBackend, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "inference" => Ok(TextBackend::Inference),
        "lexicon" => Ok(TextBackend::Lexicon),
        other => Err(ConfigError::InvalidEnvVar {
            var: "INSTASENT_TEXT_BACKEND".to_string(),
            reason: format!("expected `inference` or `lexicon`, got `{other}`"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
