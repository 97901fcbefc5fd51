//! Keyed option repository.

use async_trait::async_trait;
use sqlx::PgPool;

use stateless_core::error::{AppError, ErrorKind};
use stateless_core::result::AppResult;
use stateless_core::traits::options::OptionStore;

/// [`OptionStore`] over the `stateless_options` table.
#[derive(Debug, Clone)]
pub struct OptionRepository {
    pool: PgPool,
}

impl OptionRepository {
    /// Create a new option repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OptionStore for OptionRepository {
    async fn get(&self, key: &str) -> AppResult<Option<serde_json::Value>> {
        sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT value FROM stateless_options WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read option", e))
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO stateless_options (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to write option", e))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM stateless_options WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete option", e)
            })?;
        Ok(())
    }
}
