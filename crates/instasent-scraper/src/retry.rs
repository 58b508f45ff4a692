//! Bounded-attempt retry with a fixed rate-limit delay.
//!
//! [`with_retry`] re-runs an operation according to the [`FailureKind`] of each
//! error it returns:
//!
//! | Kind | Action |
//! |------|--------|
//! | [`FailureKind::RateLimited`] | sleep `rate_limit_delay` (fixed), then retry |
//! | [`FailureKind::Transient`] | log the cause, retry immediately |
//! | [`FailureKind::Permanent`] | return the error, remaining attempts unused |
//!
//! After `max_attempts` failures the last error is returned.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// How a failed upstream call should be treated by [`with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    RateLimited,
    Transient,
    Permanent,
}

/// Maps an error value onto a [`FailureKind`].
pub trait Classify {
    fn failure_kind(&self) -> FailureKind;
}

impl Classify for ScraperError {
    /// **Rate limited:** HTTP 429.
    ///
    /// **Transient:** timeouts, connection failures, 5xx responses, and bodies
    /// that do not parse (Instagram occasionally serves an HTML interstitial in
    /// place of JSON).
    ///
    /// **Permanent:** everything else; retrying a 404, a private profile, or a
    /// rejected login returns the same answer.
    fn failure_kind(&self) -> FailureKind {
        match self {
            ScraperError::RateLimited { .. } => FailureKind::RateLimited,
            ScraperError::Http(e) if e.is_timeout() || e.is_connect() => FailureKind::Transient,
            ScraperError::Deserialize { .. } => FailureKind::Transient,
            ScraperError::UnexpectedStatus { status, .. } if *status >= 500 => {
                FailureKind::Transient
            }
            ScraperError::Http(_)
            | ScraperError::NotFound { .. }
            | ScraperError::ProfileNotFound { .. }
            | ScraperError::PrivateProfile { .. }
            | ScraperError::Unauthorized { .. }
            | ScraperError::UnexpectedStatus { .. }
            | ScraperError::LoginFailed(_)
            | ScraperError::InvalidUrl { .. }
            | ScraperError::PaginationLimit { .. } => FailureKind::Permanent,
        }
    }
}

/// Attempt budget and rate-limit sleep for [`with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Values below 1 are treated as 1.
    pub max_attempts: u32,
    /// Fixed sleep after a rate-limited attempt.
    pub rate_limit_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            rate_limit_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, rate_limit_delay: Duration) -> Self {
        Self {
            max_attempts,
            rate_limit_delay,
        }
    }

    /// Policy that never retries. Used where a single attempt is wanted.
    #[must_use]
    pub fn single_attempt() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

/// Runs `operation` until it succeeds, fails permanently, or the policy's
/// attempts are used up.
///
/// No sleep follows the final attempt.
///
/// # Errors
///
/// Returns the first permanent error, or the last error once all attempts
/// have failed.
pub async fn with_retry<T, E, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T, E>
where
    E: Classify + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let kind = err.failure_kind();
        tracing::warn!(
            attempt,
            max_attempts,
            kind = ?kind,
            error = %err,
            "upstream attempt failed"
        );

        if kind == FailureKind::Permanent || attempt >= max_attempts {
            return Err(err);
        }

        if kind == FailureKind::RateLimited {
            tracing::warn!(
                delay_secs = policy.rate_limit_delay.as_secs(),
                "rate limit exceeded; sleeping before retry"
            );
            tokio::time::sleep(policy.rate_limit_delay).await;
        } else {
            tracing::debug!(error = %err, "transient failure; retrying immediately");
        }
    }
}
