//! Keyed option storage.

use async_trait::async_trait;

use crate::result::AppResult;

/// Persistent key/value settings, values stored as JSON.
///
/// Backs the failed-attachment registry and the progress markers. The
/// store itself is not transactional; callers serialize read-modify-write
/// sequences per key.
#[async_trait]
pub trait OptionStore: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist.
    async fn get(&self, key: &str) -> AppResult<Option<serde_json::Value>>;

    /// Insert or replace a value.
    async fn set(&self, key: &str, value: &serde_json::Value) -> AppResult<()>;

    /// Delete a key. Missing keys are not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;
}
