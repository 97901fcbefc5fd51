//! Progress markers.

use std::sync::Arc;

use serde_json::Value;

use stateless_core::result::AppResult;
use stateless_core::traits::options::OptionStore;
use stateless_entity::attachment::MimeClass;

use crate::locks::KeyedLocks;

/// Per-class `first_processed` / `last_processed` bookkeeping.
///
/// Attachment listings run newest first, so `last_processed` is a low
/// watermark: it only ever moves to a smaller id.
#[derive(Debug, Clone)]
pub struct ProgressMarker {
    options: Arc<dyn OptionStore>,
    locks: Arc<KeyedLocks>,
}

impl ProgressMarker {
    /// Create a marker over an option store.
    pub fn new(options: Arc<dyn OptionStore>, locks: Arc<KeyedLocks>) -> Self {
        Self { options, locks }
    }

    fn first_key(class: MimeClass) -> String {
        format!("stateless_{}_first_processed", class.option_key())
    }

    fn last_key(class: MimeClass) -> String {
        format!("stateless_{}_last_processed", class.option_key())
    }

    /// Record that `attachment_id` was processed.
    pub async fn record(&self, class: MimeClass, attachment_id: i64) -> AppResult<()> {
        let _guard = self
            .locks
            .lock(&format!("stateless_{}_progress", class.option_key()))
            .await;

        let first_key = Self::first_key(class);
        if self.read(&first_key).await?.is_none() {
            self.options.set(&first_key, &Value::from(attachment_id)).await?;
        }

        let last_key = Self::last_key(class);
        match self.read(&last_key).await? {
            Some(last) if attachment_id >= last => {}
            _ => self.options.set(&last_key, &Value::from(attachment_id)).await?,
        }
        Ok(())
    }

    /// First id ever processed for `class`.
    pub async fn first_processed(&self, class: MimeClass) -> AppResult<Option<i64>> {
        self.read(&Self::first_key(class)).await
    }

    /// Smallest id processed so far for `class`.
    pub async fn last_processed(&self, class: MimeClass) -> AppResult<Option<i64>> {
        self.read(&Self::last_key(class)).await
    }

    /// Reads a positive id; zero and malformed values count as unset.
    async fn read(&self, key: &str) -> AppResult<Option<i64>> {
        let value = self.options.get(key).await?;
        Ok(value
            .and_then(|v| v.as_i64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
            .filter(|id| *id > 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stateless_database::memory::MemoryOptionStore;

    fn marker() -> ProgressMarker {
        ProgressMarker::new(
            Arc::new(MemoryOptionStore::new()),
            Arc::new(KeyedLocks::new()),
        )
    }

    #[tokio::test]
    async fn test_low_watermark() {
        let marker = marker();
        for id in [50, 10, 30] {
            marker.record(MimeClass::Image, id).await.unwrap();
        }

        assert_eq!(marker.first_processed(MimeClass::Image).await.unwrap(), Some(50));
        assert_eq!(marker.last_processed(MimeClass::Image).await.unwrap(), Some(10));
    }

    #[tokio::test]
    async fn test_classes_are_independent() {
        let marker = marker();
        marker.record(MimeClass::Image, 8).await.unwrap();
        marker.record(MimeClass::Other, 3).await.unwrap();

        assert_eq!(marker.last_processed(MimeClass::Image).await.unwrap(), Some(8));
        assert_eq!(marker.first_processed(MimeClass::Other).await.unwrap(), Some(3));
    }
}
