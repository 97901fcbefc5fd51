//! In-memory option store.

use async_trait::async_trait;
use dashmap::DashMap;

use stateless_core::result::AppResult;
use stateless_core::traits::options::OptionStore;

/// [`OptionStore`] backed by a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryOptionStore {
    values: DashMap<String, serde_json::Value>,
}

impl MemoryOptionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OptionStore for MemoryOptionStore {
    async fn get(&self, key: &str) -> AppResult<Option<serde_json::Value>> {
        Ok(self.values.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> AppResult<()> {
        self.values.insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.values.remove(key);
        Ok(())
    }
}
