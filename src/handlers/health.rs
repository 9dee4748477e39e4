//! Health check handler

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
    pub version: String,
}

/// GET /health - Liveness plus store connectivity
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status, store) = match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "healthy", "connected".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "unhealthy",
                format!("error: {}", e),
            )
        }
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            store,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
