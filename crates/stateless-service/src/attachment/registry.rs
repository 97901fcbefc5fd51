//! Failed-attachment registry.

use std::sync::Arc;

use serde_json::Value;

use stateless_core::result::AppResult;
use stateless_core::traits::options::OptionStore;
use stateless_entity::attachment::MimeClass;

use crate::locks::KeyedLocks;

/// Per-class sets of attachment ids whose processing failed.
///
/// Stored as JSON arrays under `stateless_failed_{images|other}`.
#[derive(Debug, Clone)]
pub struct FailedAttachmentRegistry {
    options: Arc<dyn OptionStore>,
    locks: Arc<KeyedLocks>,
}

impl FailedAttachmentRegistry {
    /// Create a registry over an option store.
    pub fn new(options: Arc<dyn OptionStore>, locks: Arc<KeyedLocks>) -> Self {
        Self { options, locks }
    }

    /// Option key holding the set for `class`.
    pub fn option_key(class: MimeClass) -> String {
        format!("stateless_failed_{}", class.option_key())
    }

    /// Ids currently registered for `class`, in insertion order.
    pub async fn list(&self, class: MimeClass) -> AppResult<Vec<i64>> {
        let value = self.options.get(&Self::option_key(class)).await?;
        Ok(parse_ids(value))
    }

    /// Register a failure. Returns `false` if the id was already present.
    pub async fn add(&self, class: MimeClass, attachment_id: i64) -> AppResult<bool> {
        let key = Self::option_key(class);
        let _guard = self.locks.lock(&key).await;

        let mut ids = parse_ids(self.options.get(&key).await?);
        if ids.contains(&attachment_id) {
            return Ok(false);
        }
        ids.push(attachment_id);
        self.options.set(&key, &Value::from(ids)).await?;
        Ok(true)
    }

    /// Drop an id after it processed successfully. Returns `true` if it
    /// was present. The option is deleted once the set is empty.
    pub async fn remove(&self, class: MimeClass, attachment_id: i64) -> AppResult<bool> {
        let key = Self::option_key(class);
        let _guard = self.locks.lock(&key).await;

        let mut ids = parse_ids(self.options.get(&key).await?);
        let before = ids.len();
        ids.retain(|id| *id != attachment_id);
        if ids.len() == before {
            return Ok(false);
        }
        if ids.is_empty() {
            self.options.delete(&key).await?;
        } else {
            self.options.set(&key, &Value::from(ids)).await?;
        }
        Ok(true)
    }
}

/// Tolerates absent or malformed values by treating them as empty.
fn parse_ids(value: Option<Value>) -> Vec<i64> {
    value
        .and_then(|v| v.as_array().cloned())
        .unwrap_or_default()
        .iter()
        .filter_map(|v| v.as_i64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stateless_database::memory::MemoryOptionStore;

    fn registry() -> (FailedAttachmentRegistry, Arc<MemoryOptionStore>) {
        let options = Arc::new(MemoryOptionStore::new());
        (
            FailedAttachmentRegistry::new(options.clone(), Arc::new(KeyedLocks::new())),
            options,
        )
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let (registry, _) = registry();
        assert!(registry.add(MimeClass::Image, 4).await.unwrap());
        assert!(!registry.add(MimeClass::Image, 4).await.unwrap());
        assert_eq!(registry.list(MimeClass::Image).await.unwrap(), vec![4]);
        assert!(registry.list(MimeClass::Other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_adds_store_one_entry() {
        let (registry, _) = registry();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry.add(MimeClass::Other, 12).await.unwrap()
            }));
        }
        let mut added = 0;
        for handle in handles {
            if handle.await.unwrap() {
                added += 1;
            }
        }
        assert_eq!(added, 1);
        assert_eq!(registry.list(MimeClass::Other).await.unwrap(), vec![12]);
    }

    #[tokio::test]
    async fn test_remove() {
        let (registry, options) = registry();
        registry.add(MimeClass::Image, 1).await.unwrap();
        registry.add(MimeClass::Image, 2).await.unwrap();

        assert!(registry.remove(MimeClass::Image, 1).await.unwrap());
        assert!(!registry.remove(MimeClass::Image, 1).await.unwrap());
        assert_eq!(
            options.get("stateless_failed_images").await.unwrap(),
            Some(json!([2]))
        );

        assert!(registry.remove(MimeClass::Image, 2).await.unwrap());
        assert!(options.get("stateless_failed_images").await.unwrap().is_none());
        assert!(registry.list(MimeClass::Image).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_value_reads_as_empty() {
        let (registry, options) = registry();
        options
            .set("stateless_failed_other", &json!("corrupted"))
            .await
            .unwrap();
        assert!(registry.list(MimeClass::Other).await.unwrap().is_empty());
        assert!(registry.add(MimeClass::Other, 3).await.unwrap());
    }
}
