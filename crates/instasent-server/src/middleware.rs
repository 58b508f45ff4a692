//! Request tagging and analysis throttling.
//!
//! Every analysis fans out into a profile lookup, feed pages, image downloads
//! and model calls, so the analysis routes share one admission budget.
//! Rejections answer in the caller's format: the JSON envelope under
//! `/api/`, an HTML page for the form route.

use std::{
    collections::VecDeque,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::RETRY_AFTER, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;
use crate::web;

/// Longest caller-supplied request ID echoed back.
const MAX_REQUEST_ID_LEN: usize = 64;

/// Correlation ID for one request, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Caller's `x-request-id` when it is short and made of token characters.
fn incoming_request_id(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get("x-request-id")?.to_str().ok()?.trim();
    let acceptable = !raw.is_empty()
        && raw.len() <= MAX_REQUEST_ID_LEN
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    acceptable.then(|| raw.to_owned())
}

/// Tags the request with a [`RequestId`] and echoes it as `x-request-id`.
///
/// Anything unusable in the incoming header is replaced with a fresh `UUIDv4`
/// so log lines and error envelopes never carry caller-controlled junk.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = incoming_request_id(req.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());
    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", value);
    }
    res
}

/// Sliding-window admission budget for analyses.
///
/// Remembers when each admitted analysis started; a new one is admitted
/// while fewer than `limit` started within the trailing `window`.
#[derive(Debug, Clone)]
pub struct AnalysisThrottle {
    limit: usize,
    window: Duration,
    admitted: Arc<Mutex<VecDeque<Instant>>>,
}

impl AnalysisThrottle {
    #[must_use]
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            admitted: Arc::new(Mutex::new(VecDeque::with_capacity(limit))),
        }
    }

    #[must_use]
    pub fn per_minute(limit: usize) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    /// Admits an analysis starting at `now`, or returns how long until the
    /// oldest admission leaves the window.
    async fn try_admit(&self, now: Instant) -> Result<(), Duration> {
        let mut admitted = self.admitted.lock().await;
        while admitted
            .front()
            .is_some_and(|started| now.saturating_duration_since(*started) >= self.window)
        {
            admitted.pop_front();
        }

        if admitted.len() < self.limit {
            admitted.push_back(now);
            return Ok(());
        }
        let oldest = admitted.front().copied().unwrap_or(now);
        Err(self.window.saturating_sub(now.saturating_duration_since(oldest)))
    }
}

/// Whole seconds for `Retry-After`, never zero.
fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

/// Rejects analyses over the [`AnalysisThrottle`] budget with 429 and
/// `Retry-After`.
pub async fn throttle_analyses(
    State(throttle): State<AnalysisThrottle>,
    req: Request,
    next: Next,
) -> Response {
    let wait = match throttle.try_admit(Instant::now()).await {
        Ok(()) => return next.run(req).await,
        Err(wait) => retry_after_secs(wait),
    };

    let path = req.uri().path();
    tracing::warn!(path, retry_after_secs = wait, "analysis rejected by throttle");

    let mut res = if path.starts_with("/api/") {
        let req_id = req
            .extensions()
            .get::<RequestId>()
            .map_or_else(|| Uuid::new_v4().to_string(), |id| id.0.clone());
        ApiError::new(
            req_id,
            "rate_limited",
            format!("too many analyses; retry in {wait}s"),
        )
        .into_response()
    } else {
        web::too_many_analyses_page(wait)
    };
    res.headers_mut()
        .insert(RETRY_AFTER, HeaderValue::from(wait));
    res
}
