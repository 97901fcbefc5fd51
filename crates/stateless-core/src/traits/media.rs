//! Host media library collaborators.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// An entry of the host media library as the library reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAttachment {
    /// Attachment identifier.
    pub id: i64,
    /// Post kind; only `"attachment"` entries are processable.
    pub kind: String,
    /// Display title.
    pub title: String,
    /// Stored MIME type.
    pub mime_type: String,
    /// File path relative to the upload directory, if one is recorded.
    pub file: Option<String>,
    /// Public URL of the original upload.
    pub guid: String,
}

/// Media listing, lookup and metadata persistence.
#[async_trait]
pub trait MediaLibrary: Send + Sync + std::fmt::Debug + 'static {
    /// Look up an entry by id.
    async fn find(&self, id: i64) -> AppResult<Option<MediaAttachment>>;

    /// Ids of every image attachment, newest (highest id) first.
    async fn image_ids(&self) -> AppResult<Vec<i64>>;

    /// Ids of every non-image attachment, newest (highest id) first.
    async fn other_ids(&self) -> AppResult<Vec<i64>>;

    /// Persist the rendition/size metadata map of an attachment.
    async fn update_metadata(&self, id: i64, metadata: &serde_json::Value) -> AppResult<()>;
}

/// Regenerates derived renditions for an attachment's file.
#[async_trait]
pub trait RenditionGenerator: Send + Sync + std::fmt::Debug + 'static {
    /// Produce renditions for `path` and return the attachment metadata map.
    ///
    /// An empty map means nothing could be generated.
    async fn regenerate(
        &self,
        attachment: &MediaAttachment,
        path: &Path,
    ) -> AppResult<serde_json::Value>;
}
