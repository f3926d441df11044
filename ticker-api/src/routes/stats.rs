//! Trading pair statistics endpoint

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::{debug, error};

use super::not_ready;
use crate::AppState;

/// Last published statistics as a JSON array
async fn get_stats(State(state): State<AppState>) -> Response {
    let Some(snapshot) = state.snapshots.current() else {
        return not_ready();
    };

    match serde_json::to_vec(snapshot.stats()) {
        Ok(body) => {
            debug!(
                "Serving {} stat records published at {}",
                snapshot.len(),
                snapshot.published_at()
            );
            ([(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Err(e) => {
            error!("Failed to serialize stats: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Create stats routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/stats", get(get_stats))
}
