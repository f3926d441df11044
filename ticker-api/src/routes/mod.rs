//! API route definitions

mod health;
mod stats;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};

use crate::AppState;

/// Create all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(stats::routes())
        .merge(health::routes())
}

/// Answer for every endpoint before the first snapshot is published
fn not_ready() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, "Stats are not ready").into_response()
}
