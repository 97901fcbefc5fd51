//! In-memory media library.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use stateless_core::result::AppResult;
use stateless_core::traits::media::{MediaAttachment, MediaLibrary};

#[derive(Debug, Clone)]
struct Entry {
    attachment: MediaAttachment,
    metadata: serde_json::Value,
}

/// [`MediaLibrary`] over a map, used by tests and the memory provider.
#[derive(Debug)]
pub struct MemoryMediaLibrary {
    entries: RwLock<BTreeMap<i64, Entry>>,
    next_id: AtomicI64,
}

impl MemoryMediaLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Insert or replace an entry under its own id.
    pub async fn insert(&self, attachment: MediaAttachment) {
        self.next_id.fetch_max(attachment.id + 1, Ordering::SeqCst);
        self.entries.write().await.insert(
            attachment.id,
            Entry {
                attachment,
                metadata: serde_json::Value::Object(serde_json::Map::new()),
            },
        );
    }

    /// Register a new attachment entry and return its id.
    pub async fn create(&self, title: &str, mime_type: &str, file: &str, guid: &str) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.insert(MediaAttachment {
            id,
            kind: "attachment".to_string(),
            title: title.to_string(),
            mime_type: mime_type.to_string(),
            file: Some(file.to_string()),
            guid: guid.to_string(),
        })
        .await;
        id
    }

    /// Last metadata map persisted for an entry.
    pub async fn metadata(&self, id: i64) -> Option<serde_json::Value> {
        self.entries
            .read()
            .await
            .get(&id)
            .map(|entry| entry.metadata.clone())
    }

    async fn ids_where_image(&self, image: bool) -> Vec<i64> {
        self.entries
            .read()
            .await
            .values()
            .rev()
            .filter(|entry| entry.attachment.kind == "attachment")
            .filter(|entry| entry.attachment.mime_type.starts_with("image/") == image)
            .map(|entry| entry.attachment.id)
            .collect()
    }
}

impl Default for MemoryMediaLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaLibrary for MemoryMediaLibrary {
    async fn find(&self, id: i64) -> AppResult<Option<MediaAttachment>> {
        Ok(self
            .entries
            .read()
            .await
            .get(&id)
            .map(|entry| entry.attachment.clone()))
    }

    async fn image_ids(&self) -> AppResult<Vec<i64>> {
        Ok(self.ids_where_image(true).await)
    }

    async fn other_ids(&self) -> AppResult<Vec<i64>> {
        Ok(self.ids_where_image(false).await)
    }

    async fn update_metadata(&self, id: i64, metadata: &serde_json::Value) -> AppResult<()> {
        if let Some(entry) = self.entries.write().await.get_mut(&id) {
            entry.metadata = metadata.clone();
        }
        Ok(())
    }
}
