//! Schema migrations for the stateless tables.

use sqlx::PgPool;
use tracing::info;

use stateless_core::error::{AppError, ErrorKind};
use stateless_core::result::AppResult;

/// Apply every pending migration from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    info!("Applying stateless schema migrations");

    let migrator = sqlx::migrate!("../../migrations");
    migrator.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    info!(
        applied = migrator.iter().count(),
        "Schema migrations up to date"
    );
    Ok(())
}
