//! Job repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use stateless_core::error::{AppError, ErrorKind};
use stateless_core::result::AppResult;
use stateless_entity::job::{CreateJob, Job, JobStatus, JobUpdate};

use crate::store::JobStore;

/// Repository for `stateless_jobs` rows.
#[derive(Debug, Clone)]
pub struct JobRepository {
    pool: PgPool,
}

impl JobRepository {
    /// Create a new job repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for JobRepository {
    async fn create(&self, data: &CreateJob) -> AppResult<Job> {
        sqlx::query_as::<_, Job>(
            "INSERT INTO stateless_jobs \
             (label, type, status, bulk_size, payload, synced_items, failed_items, callback_secret) \
             VALUES ($1, $2, $3, $4, $5, '{}', '{}', $6) RETURNING *",
        )
        .bind(&data.label)
        .bind(data.action.as_str())
        .bind(JobStatus::New)
        .bind(data.bulk_size)
        .bind(&data.payload)
        .bind(&data.callback_secret)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create job", e))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Job>> {
        sqlx::query_as::<_, Job>("SELECT * FROM stateless_jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find job", e))
    }

    async fn list_incomplete(&self) -> AppResult<Vec<i64>> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM stateless_jobs WHERE status <> $1 ORDER BY id")
            .bind(JobStatus::Completed)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list jobs", e))
    }

    async fn update(&self, id: i64, update: &JobUpdate) -> AppResult<Option<Job>> {
        sqlx::query_as::<_, Job>(
            "UPDATE stateless_jobs SET \
             status = COALESCE($2, status), \
             synced_items = COALESCE($3, synced_items), \
             failed_items = COALESCE($4, failed_items), \
             updated_on = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(update.status)
        .bind(update.synced_items.as_deref())
        .bind(update.failed_items.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update job", e))
    }
}
