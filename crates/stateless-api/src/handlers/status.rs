//! Liveness handler.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use crate::dto::response::StatusResponse;
use crate::state::AppState;

/// GET /status
///
/// Always answers while the API is up; also reports whether the bucket and
/// the database are reachable.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let storage = state.object_store.is_connected().await;

    let database = match &state.db_pool {
        Some(pool) => pool.health_check().await.unwrap_or_else(|e| {
            warn!(error = %e.message, "Database health check failed");
            false
        }),
        None => true,
    };

    Json(StatusResponse {
        ok: true,
        message: "API up.".to_string(),
        storage,
        database,
    })
}
