mod analyze;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use instasent_sentiment::Analyzer;

use crate::middleware::{request_id, throttle_analyses, AnalysisThrottle, RequestId};
use crate::web;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Analyzer,
    pub posts: PostCountLimits,
}

/// Post-count bounds applied at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostCountLimits {
    pub default: usize,
    pub max: usize,
}

impl PostCountLimits {
    /// `requested` clamped to `1..=max`; `None` selects the default.
    #[must_use]
    pub fn normalize(self, requested: Option<i64>) -> usize {
        let max = self.max.max(1);
        match requested {
            None => self.default.clamp(1, max),
            Some(n) => usize::try_from(n.max(1)).map_or(max, |n| n.min(max)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

/// Routes that run an analysis; each request may cost several upstream calls.
fn analysis_router(throttle: AnalysisThrottle) -> Router<AppState> {
    Router::new()
        .route("/analyze", post(web::analyze_form))
        .route("/api/v1/analyze", post(analyze::analyze_profile))
        .layer(axum::middleware::from_fn_with_state(
            throttle,
            throttle_analyses,
        ))
}

pub fn build_app(state: AppState, throttle: AnalysisThrottle) -> Router {
    let public_routes = Router::new()
        .route("/", get(web::index))
        .route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(analysis_router(throttle))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData { status: "ok" },
        meta: ResponseMeta::new(req_id.0),
    })
}
