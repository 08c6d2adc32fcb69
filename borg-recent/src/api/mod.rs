//! HTTP API module for borg-recent.

pub mod health;
pub mod recent;

use crate::pipeline::Pipeline;
use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub started_at: Instant,
}

/// Create shared application state
pub fn create_app_state(pipeline: Pipeline) -> AppState {
    AppState {
        pipeline: Arc::new(pipeline),
        started_at: Instant::now(),
    }
}

/// Create the API router with all endpoints
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/recent", get(recent::recent))
        // Health endpoints
        .route("/health", get(health::health))
        .route("/version", get(health::version))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
