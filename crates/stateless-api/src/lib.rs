//! # stateless-api
//!
//! HTTP API layer for Stateless Media built on Axum.
//!
//! Exposes the REST gateway under the configured namespace: service
//! status, job listing and detail, lifecycle steps, job creation and the
//! per-attachment processing callback. Also owns server bootstrap.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{Stores, assemble_state, build_app, build_state, run_server};
pub use state::AppState;
