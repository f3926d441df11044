//! Health check endpoint

use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;

use super::not_ready;
use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    healthy: bool,
    version: String,
}

/// Healthy once a snapshot has been published
async fn health_check(State(state): State<AppState>) -> Response {
    if !state.snapshots.is_ready() {
        return not_ready();
    }

    Json(HealthResponse {
        healthy: true,
        version: state.version.to_string(),
    })
    .into_response()
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/healthcheck", get(health_check))
}
