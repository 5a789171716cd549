// Health check endpoint

use axum::response::IntoResponse;

/// GET /health - liveness probe, no dependencies touched
pub async fn health_check() -> impl IntoResponse {
    "OK"
}
