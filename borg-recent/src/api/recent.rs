//! `GET /recent`

use crate::pipeline::{collect_recent, RecentEntry};
use crate::utils::errors::RecentError;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

/// Pipeline failure surfaced as `500` with the raw error text.
#[derive(Debug)]
pub struct ApiError(RecentError);

impl From<RecentError> for ApiError {
    fn from(err: RecentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Failed to collect recent archives: {}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

/// GET /recent - newest archive per repository, oldest first
pub async fn recent(
    State(state): State<super::AppState>,
) -> Result<Json<Vec<RecentEntry>>, ApiError> {
    let entries = collect_recent(state.pipeline.clone()).await?;
    Ok(Json(entries))
}
