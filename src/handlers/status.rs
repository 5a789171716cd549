// Service status endpoint

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::handlers::AppState;

/// GET /status - database reachability and the chain RPC tip. Probe
/// failures become "error" fields, never a failed response.
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let database = match state.repositories.projects.count_all().await {
        Ok(projects) => json!({ "reachable": true, "projects": projects }),
        Err(err) => {
            tracing::warn!("status database probe failed: {err}");
            json!({ "reachable": false, "error": "unreachable" })
        }
    };

    let chain = match state.chain.block_number().await {
        Ok(block) => json!({ "rpc": "ok", "latest_block": block }),
        Err(err) => {
            tracing::warn!("status chain probe failed: {err}");
            json!({ "rpc": "error", "latest_block": null })
        }
    };

    Json(json!({
        "database": database,
        "chain": chain,
    }))
}
