use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::Deserialize;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    username: String,
    #[serde(default)]
    num_posts: Option<i64>,
}

/// `POST /api/v1/analyze`: runs one analysis and returns the result in the
/// standard envelope. An unknown profile is a 200 carrying the error marker.
pub(super) async fn analyze_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = body.username.trim();
    if username.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "username is required",
        ));
    }
    let post_count = state.posts.normalize(body.num_posts);

    match state.analyzer.analyze(username, post_count).await {
        Ok(result) => Ok(Json(ApiResponse {
            data: result,
            meta: ResponseMeta::new(req_id.0),
        })),
        Err(e) => {
            tracing::error!(username, error = %e, "analysis failed");
            Err(ApiError::new(
                req_id.0,
                "internal_error",
                "analysis could not be performed",
            ))
        }
    }
}
