//! Object store client contract.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Metadata of a stored object.
///
/// Field set and JSON names follow the Cloud Storage object resource so
/// records can be handed to consumers expecting that shape unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectRecord {
    /// `{bucket}/{name}/{generation}`.
    pub id: String,
    /// Object name within the bucket.
    pub name: String,
    /// Download URL.
    pub media_link: String,
    /// Resource URL.
    pub self_link: String,
    /// Storage class (e.g. `MULTI_REGIONAL`).
    pub storage_class: String,
    /// Bucket name.
    pub bucket: String,
    /// `Cache-Control` header value.
    pub cache_control: Option<String>,
    /// `Content-Disposition` header value.
    pub content_disposition: Option<String>,
    /// MIME type.
    pub content_type: String,
    /// Object generation.
    pub generation: String,
    /// User metadata.
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// Number of composed components.
    pub component_count: Option<u32>,
    /// `Content-Encoding` header value.
    pub content_encoding: Option<String>,
    /// `Content-Language` header value.
    pub content_language: Option<String>,
    /// CRC32C checksum.
    pub crc32c: String,
    /// Entity tag.
    pub etag: String,
    /// Resource kind.
    pub kind: String,
    /// MD5 checksum.
    pub md5_hash: String,
    /// Metadata generation.
    pub metageneration: String,
    /// Size in bytes, as a decimal string.
    pub size: String,
    /// RFC 3339 creation time.
    pub time_created: String,
    /// RFC 3339 deletion time.
    pub time_deleted: Option<String>,
    /// RFC 3339 last update time.
    pub updated: String,
}

/// Upload request for [`ObjectStore::put`].
#[derive(Debug, Clone)]
pub struct PutObject {
    /// Object name. Falls back to the local file name when empty.
    pub name: String,
    /// File to upload.
    pub local_path: PathBuf,
    /// MIME type of the content.
    pub mime_type: String,
    /// User metadata stored with the object.
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// Optional `Cache-Control` header.
    pub cache_control: Option<String>,
    /// Optional `Content-Disposition` header.
    pub content_disposition: Option<String>,
}

impl PutObject {
    /// Create an upload request with no metadata.
    pub fn new(name: impl Into<String>, local_path: impl Into<PathBuf>, mime_type: &str) -> Self {
        Self {
            name: name.into(),
            local_path: local_path.into(),
            mime_type: mime_type.to_string(),
            metadata: serde_json::Map::new(),
            cache_control: None,
            content_disposition: None,
        }
    }

    /// The effective object name.
    pub fn object_name(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        self.local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Trait for remote bucket clients.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., `"memory"`, `"gcs"`).
    fn provider_type(&self) -> &str;

    /// The bucket this client targets.
    fn bucket(&self) -> &str;

    /// Upload a local file and return the stored object's record.
    async fn put(&self, request: PutObject) -> AppResult<ObjectRecord>;

    /// Check whether an object exists.
    async fn exists(&self, name: &str) -> AppResult<bool>;

    /// Fetch the record of an object, if it exists.
    async fn record(&self, name: &str) -> AppResult<Option<ObjectRecord>>;

    /// Download an object to `save_to`; returns the HTTP-style status code
    /// (200 on success, 404 when the object is absent). Any other refusal
    /// is an error, and `save_to` is left untouched when the download fails.
    async fn get(&self, name: &str, save_to: &Path) -> AppResult<u16>;

    /// Delete an object. Returns `true` if it existed.
    async fn delete(&self, name: &str) -> AppResult<bool>;

    /// Whether the bucket is reachable with the configured credentials.
    async fn is_connected(&self) -> bool;
}
