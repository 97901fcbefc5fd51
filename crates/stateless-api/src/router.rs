//! Route definitions for the Stateless REST gateway.
//!
//! All routes are mounted under `config.server.namespace`. The router
//! receives `AppState` and passes it to all handlers via Axum's `State`
//! extractor.

use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// Build the API router with every route nested under the namespace.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(status_routes())
        .merge(job_routes())
        .merge(attachment_routes());

    let namespace = normalize_namespace(&state.config.server.namespace);
    let router = if namespace.is_empty() {
        Router::new().merge(api_routes)
    } else {
        Router::new().nest(&namespace, api_routes)
    };

    router.with_state(state)
}

/// `/stateless/v1/` and `stateless/v1` both become `/stateless/v1`; the root
/// namespace becomes empty.
pub fn normalize_namespace(namespace: &str) -> String {
    let trimmed = namespace.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Liveness.
fn status_routes() -> Router<AppState> {
    Router::new().route("/status", get(handlers::status::status))
}

/// Job listing, detail, creation and lifecycle steps.
fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(handlers::job::list_jobs))
        .route("/job/create", post(handlers::job::create_job))
        .route("/job/create/", post(handlers::job::create_job))
        .route("/job/{id}", get(handlers::job::get_job))
        .route("/job/{id}/{step}", get(handlers::job::job_step))
        .route("/job/{id}/step/{step}", get(handlers::job::job_step))
}

/// Per-attachment processing callback.
fn attachment_routes() -> Router<AppState> {
    Router::new().route(
        "/process_attachment/{id}",
        get(handlers::attachment::process_attachment),
    )
}
