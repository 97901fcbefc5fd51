//! Media library repository.

use async_trait::async_trait;
use sqlx::PgPool;

use stateless_core::error::{AppError, ErrorKind};
use stateless_core::result::AppResult;
use stateless_core::traits::media::{MediaAttachment, MediaLibrary};

type AttachmentRow = (i64, String, String, String, Option<String>, String);

/// [`MediaLibrary`] over the `stateless_attachments` table.
#[derive(Debug, Clone)]
pub struct AttachmentRepository {
    pool: PgPool,
}

impl AttachmentRepository {
    /// Create a new attachment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ids_where_image(&self, image: bool) -> AppResult<Vec<i64>> {
        sqlx::query_scalar::<_, i64>(
            "SELECT id FROM stateless_attachments \
             WHERE kind = 'attachment' AND (mime_type LIKE 'image/%') = $1 \
             ORDER BY id DESC",
        )
        .bind(image)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list attachments", e))
    }
}

#[async_trait]
impl MediaLibrary for AttachmentRepository {
    async fn find(&self, id: i64) -> AppResult<Option<MediaAttachment>> {
        let row = sqlx::query_as::<_, AttachmentRow>(
            "SELECT id, kind, title, mime_type, file, guid FROM stateless_attachments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find attachment", e))?;

        Ok(row.map(|(id, kind, title, mime_type, file, guid)| MediaAttachment {
            id,
            kind,
            title,
            mime_type,
            file,
            guid,
        }))
    }

    async fn image_ids(&self) -> AppResult<Vec<i64>> {
        self.ids_where_image(true).await
    }

    async fn other_ids(&self) -> AppResult<Vec<i64>> {
        self.ids_where_image(false).await
    }

    async fn update_metadata(&self, id: i64, metadata: &serde_json::Value) -> AppResult<()> {
        sqlx::query("UPDATE stateless_attachments SET metadata = $2 WHERE id = $1")
            .bind(id)
            .bind(metadata)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update attachment metadata", e)
            })?;
        Ok(())
    }
}
