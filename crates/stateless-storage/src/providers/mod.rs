//! Object store client implementations.

pub mod gcs;
pub mod memory;

use std::sync::Arc;

use tracing::info;

use stateless_core::config::StorageConfig;
use stateless_core::error::AppError;
use stateless_core::result::AppResult;
use stateless_core::traits::object_store::ObjectStore;

use crate::credentials::ServiceAccountKey;

pub use gcs::GcsObjectStore;
pub use memory::MemoryObjectStore;

/// Build the configured object store client.
///
/// Fails with a configuration error when the bucket is empty or the
/// service-account key is missing or has no private key.
pub fn build_object_store(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    let key = ServiceAccountKey::from_config(config)?;

    let store: Arc<dyn ObjectStore> = match config.provider.to_ascii_lowercase().as_str() {
        "memory" => Arc::new(MemoryObjectStore::new(&config.bucket)),
        "gcs" => Arc::new(GcsObjectStore::new(config, key)?),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown storage provider: '{other}'"
            )));
        }
    };

    info!(
        provider = store.provider_type(),
        bucket = store.bucket(),
        "Object store client ready"
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stateless_core::error::ErrorKind;

    #[test]
    fn test_build_memory_store() {
        let config = StorageConfig {
            bucket: "media".to_string(),
            key_json: r#"{"private_key":"unused"}"#.to_string(),
            ..StorageConfig::default()
        };
        let store = build_object_store(&config).unwrap();
        assert_eq!(store.provider_type(), "memory");
        assert_eq!(store.bucket(), "media");
    }

    #[test]
    fn test_unknown_provider() {
        let config = StorageConfig {
            provider: "ftp".to_string(),
            bucket: "media".to_string(),
            key_json: r#"{"private_key":"unused"}"#.to_string(),
            ..StorageConfig::default()
        };
        let err = build_object_store(&config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
