//! Health check endpoints.

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

/// GET /health - Health check endpoint
pub async fn health(State(state): State<super::AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.started_at.elapsed().as_secs(),
    }))
}

/// GET /version - Version information endpoint
pub async fn version() -> impl IntoResponse {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "borg_output": "1.x",
    }))
}
