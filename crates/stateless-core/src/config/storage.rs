//! Object store and upload directory configuration.

use serde::{Deserialize, Serialize};

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Object store client: `"memory"` (in-process cache) or `"gcs"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Bucket name. Must not be empty.
    #[serde(default)]
    pub bucket: String,
    /// Service-account key JSON, inline.
    #[serde(default)]
    pub key_json: String,
    /// Path to a service-account key JSON file (used when `key_json` is empty).
    #[serde(default)]
    pub key_file: String,
    /// Prefix prepended to every remote object name.
    #[serde(default)]
    pub root_dir: String,
    /// Local upload base directory attachments' files are relative to.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Timeout in seconds for object store calls.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// `Cache-Control` header stored with uploaded objects.
    #[serde(default = "default_cache_control")]
    pub cache_control: String,
    /// Derived image sizes produced during regeneration.
    #[serde(default = "default_rendition_sizes")]
    pub rendition_sizes: Vec<RenditionSize>,
}

/// One named rendition size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenditionSize {
    /// Size name (e.g. `"thumbnail"`).
    pub name: String,
    /// Maximum width in pixels.
    pub width: u32,
    /// Maximum height in pixels.
    pub height: u32,
    /// Crop to exact dimensions instead of fitting inside them.
    #[serde(default)]
    pub crop: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            bucket: String::new(),
            key_json: String::new(),
            key_file: String::new(),
            root_dir: String::new(),
            upload_dir: default_upload_dir(),
            timeout_seconds: default_timeout(),
            cache_control: default_cache_control(),
            rendition_sizes: default_rendition_sizes(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_upload_dir() -> String {
    "./data/uploads".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_cache_control() -> String {
    "public, max-age=36000, must-revalidate".to_string()
}

fn default_rendition_sizes() -> Vec<RenditionSize> {
    vec![
        RenditionSize {
            name: "thumbnail".to_string(),
            width: 150,
            height: 150,
            crop: true,
        },
        RenditionSize {
            name: "medium".to_string(),
            width: 300,
            height: 300,
            crop: false,
        },
        RenditionSize {
            name: "large".to_string(),
            width: 1024,
            height: 1024,
            crop: false,
        },
    ]
}
