//! In-process object store.
//!
//! Keeps uploaded bytes and a synthesized object record per name. `exists`,
//! `record` and `get` answer from this cache only.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use rand::Rng;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

use stateless_core::error::{AppError, ErrorKind};
use stateless_core::result::AppResult;
use stateless_core::traits::object_store::{ObjectRecord, ObjectStore, PutObject};

use crate::naming::encode_object_name;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    record: ObjectRecord,
}

/// [`ObjectStore`] that never leaves the process.
#[derive(Debug)]
pub struct MemoryObjectStore {
    bucket: String,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    /// Create an empty store for `bucket`.
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Store raw bytes under `name` without a local file.
    pub async fn insert(&self, name: &str, mime_type: &str, data: impl Into<Bytes>) {
        let data = data.into();
        let request = PutObject::new(name, name, mime_type);
        let record = self.synthesize_record(name, &request, data.len());
        self.objects
            .write()
            .await
            .insert(name.to_string(), StoredObject { data, record });
    }

    fn synthesize_record(&self, name: &str, request: &PutObject, size: usize) -> ObjectRecord {
        let generation = format!(
            "{:016}",
            rand::rng().random_range(1_000_000_000_000_000u64..=9_999_999_999_999_999)
        );
        let encoded = encode_object_name(name);
        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let bucket = &self.bucket;

        ObjectRecord {
            id: format!("{bucket}/{name}/{generation}"),
            name: name.to_string(),
            media_link: format!(
                "https://www.googleapis.com/download/storage/v1/b/{bucket}/o/{encoded}?generation={generation}&alt=media"
            ),
            self_link: format!("https://www.googleapis.com/storage/v1/b/{bucket}/o/{encoded}"),
            storage_class: "MULTI_REGIONAL".to_string(),
            bucket: bucket.clone(),
            cache_control: request.cache_control.clone(),
            content_disposition: request.content_disposition.clone(),
            content_type: request.mime_type.clone(),
            generation,
            metadata: request.metadata.clone(),
            component_count: None,
            content_encoding: None,
            content_language: None,
            crc32c: "12345".to_string(),
            etag: "12345".to_string(),
            kind: "storage#object".to_string(),
            md5_hash: "12345".to_string(),
            metageneration: "1".to_string(),
            size: size.to_string(),
            time_created: timestamp.clone(),
            time_deleted: None,
            updated: timestamp,
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(&self, request: PutObject) -> AppResult<ObjectRecord> {
        let name = request.object_name();
        let data = fs::read(&request.local_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read '{}' for upload", request.local_path.display()),
                e,
            )
        })?;

        let record = self.synthesize_record(&name, &request, data.len());
        self.objects.write().await.insert(
            name.clone(),
            StoredObject {
                data: Bytes::from(data),
                record: record.clone(),
            },
        );

        debug!(name = %name, bucket = %self.bucket, "Cached object");
        Ok(record)
    }

    async fn exists(&self, name: &str) -> AppResult<bool> {
        Ok(self.objects.read().await.contains_key(name))
    }

    async fn record(&self, name: &str) -> AppResult<Option<ObjectRecord>> {
        Ok(self
            .objects
            .read()
            .await
            .get(name)
            .map(|object| object.record.clone()))
    }

    async fn get(&self, name: &str, save_to: &Path) -> AppResult<u16> {
        let Some(data) = self
            .objects
            .read()
            .await
            .get(name)
            .map(|object| object.data.clone())
        else {
            return Ok(404);
        };

        if let Some(parent) = save_to.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(save_to, &data).await?;
        Ok(200)
    }

    async fn delete(&self, name: &str) -> AppResult<bool> {
        Ok(self.objects.write().await.remove(name).is_some())
    }

    async fn is_connected(&self) -> bool {
        true
    }
}
