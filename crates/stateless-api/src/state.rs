//! Shared application state passed to every handler via Axum's `State` extractor.

use std::sync::Arc;

use stateless_core::config::AppConfig;
use stateless_core::traits::object_store::ObjectStore;
use stateless_database::connection::DatabasePool;
use stateless_service::attachment::AttachmentProcessor;
use stateless_service::job::JobController;

/// Application state shared across all request handlers.
///
/// All fields are `Arc`-wrapped so cloning is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Postgres pool, absent when the in-memory provider is configured.
    pub db_pool: Option<DatabasePool>,
    /// Object store client.
    pub object_store: Arc<dyn ObjectStore>,
    /// Attachment processor.
    pub processor: Arc<AttachmentProcessor>,
    /// Job controller.
    pub jobs: Arc<JobController>,
}
