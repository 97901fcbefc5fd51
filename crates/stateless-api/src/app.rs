//! Application builder: wires stores, services, router and middleware
//! into an Axum app, and runs it.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use stateless_core::config::AppConfig;
use stateless_core::error::{AppError, ErrorKind};
use stateless_core::result::AppResult;
use stateless_core::traits::job_handler::JobHandler;
use stateless_core::traits::media::MediaLibrary;
use stateless_core::traits::object_store::ObjectStore;
use stateless_core::traits::options::OptionStore;
use stateless_database::connection::DatabasePool;
use stateless_database::memory::{MemoryJobStore, MemoryMediaLibrary, MemoryOptionStore};
use stateless_database::migration::run_migrations;
use stateless_database::repositories::{AttachmentRepository, JobRepository, OptionRepository};
use stateless_database::store::JobStore;
use stateless_service::attachment::{AttachmentProcessor, FailedAttachmentRegistry, ProgressMarker};
use stateless_service::job::{HttpJobHandler, JobController, JobLinks};
use stateless_service::locks::KeyedLocks;
use stateless_storage::providers::build_object_store;
use stateless_storage::renditions::ImageRenditionGenerator;

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// The persistence backends behind the services.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Job records.
    pub jobs: Arc<dyn JobStore>,
    /// Registry and progress options.
    pub options: Arc<dyn OptionStore>,
    /// Host media library.
    pub library: Arc<dyn MediaLibrary>,
}

impl Stores {
    /// Fresh in-process stores.
    pub fn memory() -> Self {
        Self {
            jobs: Arc::new(MemoryJobStore::new()),
            options: Arc::new(MemoryOptionStore::new()),
            library: Arc::new(MemoryMediaLibrary::new()),
        }
    }

    /// Postgres-backed stores sharing one pool.
    pub fn postgres(pool: &DatabasePool) -> Self {
        Self {
            jobs: Arc::new(JobRepository::new(pool.pool().clone())),
            options: Arc::new(OptionRepository::new(pool.pool().clone())),
            library: Arc::new(AttachmentRepository::new(pool.pool().clone())),
        }
    }
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Wire services over already-built backends.
pub fn assemble_state(
    config: AppConfig,
    db_pool: Option<DatabasePool>,
    stores: Stores,
    object_store: Arc<dyn ObjectStore>,
    handler: Arc<dyn JobHandler>,
) -> AppState {
    let locks = Arc::new(KeyedLocks::new());

    let renditions = Arc::new(ImageRenditionGenerator::new(
        Arc::clone(&object_store),
        &config.storage,
    ));
    let processor = AttachmentProcessor::new(
        Arc::clone(&stores.library),
        Arc::clone(&object_store),
        renditions,
        FailedAttachmentRegistry::new(Arc::clone(&stores.options), Arc::clone(&locks)),
        ProgressMarker::new(Arc::clone(&stores.options), Arc::clone(&locks)),
        &config.storage,
    );

    let jobs = JobController::new(
        stores.jobs,
        stores.library,
        handler,
        locks,
        JobLinks::new(config.server.root_url()),
        &config.job_handler,
    );

    AppState {
        config: Arc::new(config),
        db_pool,
        object_store,
        processor: Arc::new(processor),
        jobs: Arc::new(jobs),
    }
}

/// Connect every backend named by the configuration and wire the services.
pub async fn build_state(config: AppConfig) -> AppResult<AppState> {
    // ── Step 1: Object store ─────────────────────────────────────
    tracing::info!(
        provider = %config.storage.provider,
        bucket = %config.storage.bucket,
        "Initializing object store..."
    );
    let object_store = build_object_store(&config.storage)?;

    // ── Step 2: Persistence + migrations ─────────────────────────
    let (db_pool, stores) = if config.database.is_memory() {
        tracing::info!("Using in-memory stores");
        (None, Stores::memory())
    } else {
        tracing::info!("Connecting to database...");
        let pool = DatabasePool::connect(&config.database).await?;
        tracing::info!("Running database migrations...");
        run_migrations(pool.pool()).await?;
        let stores = Stores::postgres(&pool);
        (Some(pool), stores)
    };

    // ── Step 3: Job handler client ───────────────────────────────
    tracing::info!(endpoint = %config.job_handler.endpoint, "Initializing job handler client...");
    let handler = Arc::new(HttpJobHandler::new(&config.job_handler)?);

    // ── Step 4: Services ─────────────────────────────────────────
    Ok(assemble_state(config, db_pool, stores, object_store, handler))
}

/// Runs the Stateless server until a shutdown signal arrives.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting Stateless Media v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Upload directory ─────────────────────────────────
    tokio::fs::create_dir_all(&config.storage.upload_dir)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create dir '{}'", config.storage.upload_dir),
                e,
            )
        })?;

    // ── Step 2: Backends and services ────────────────────────────
    let state = build_state(config).await?;
    let db_pool = state.db_pool.clone();
    let server_config = state.config.server.clone();

    // ── Step 3: Build and bind HTTP server ───────────────────────
    let app = build_app(state);
    let addr = format!("{}:{}", server_config.host, server_config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(
        namespace = %server_config.namespace,
        "Stateless server listening on {}",
        addr
    );

    // ── Step 4: Graceful shutdown ────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(pool) = db_pool {
        pool.close().await;
    }

    tracing::info!("Stateless server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
