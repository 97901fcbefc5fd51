//! Attachment processor.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use stateless_core::config::StorageConfig;
use stateless_core::error::AppError;
use stateless_core::result::AppResult;
use stateless_core::traits::media::{MediaAttachment, MediaLibrary, RenditionGenerator};
use stateless_core::traits::object_store::ObjectStore;
use stateless_core::types::ProcessResult;
use stateless_entity::attachment::{Attachment, MimeClass};
use stateless_storage::naming::remote_key;

use super::progress::ProgressMarker;
use super::registry::FailedAttachmentRegistry;

/// Ensures one attachment's file is present locally and in the bucket,
/// regenerating renditions where needed.
#[derive(Debug, Clone)]
pub struct AttachmentProcessor {
    library: Arc<dyn MediaLibrary>,
    store: Arc<dyn ObjectStore>,
    renditions: Arc<dyn RenditionGenerator>,
    registry: FailedAttachmentRegistry,
    progress: ProgressMarker,
    upload_dir: PathBuf,
    root_dir: String,
}

impl AttachmentProcessor {
    /// Create a processor.
    pub fn new(
        library: Arc<dyn MediaLibrary>,
        store: Arc<dyn ObjectStore>,
        renditions: Arc<dyn RenditionGenerator>,
        registry: FailedAttachmentRegistry,
        progress: ProgressMarker,
        config: &StorageConfig,
    ) -> Self {
        Self {
            library,
            store,
            renditions,
            registry,
            progress,
            upload_dir: PathBuf::from(&config.upload_dir),
            root_dir: config.root_dir.clone(),
        }
    }

    /// The failed-attachment registry this processor writes to.
    pub fn registry(&self) -> &FailedAttachmentRegistry {
        &self.registry
    }

    /// The progress markers this processor advances.
    pub fn progress(&self) -> &ProgressMarker {
        &self.progress
    }

    /// Process one attachment. Never fails; errors become `ok = false`.
    pub async fn process(&self, attachment_id: i64) -> ProcessResult {
        let started = Instant::now();
        match self.try_process(attachment_id, started).await {
            Ok(result) => {
                info!(attachment_id, ok = result.ok, "Attachment processed");
                result
            }
            Err(e) => {
                warn!(attachment_id, kind = %e.kind, error = %e.message, "Attachment processing failed");
                ProcessResult::from(e)
            }
        }
    }

    /// Resolve an attachment against upload storage and the bucket.
    pub async fn resolve(&self, attachment_id: i64) -> AppResult<(MediaAttachment, Attachment)> {
        let media = self
            .library
            .find(attachment_id)
            .await?
            .filter(|m| m.kind == "attachment")
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Failed resize: {attachment_id} is an invalid attachment ID."
                ))
            })?;

        let local_path = self.upload_dir.join(media.file.as_deref().unwrap_or_default());
        let attachment = Attachment {
            id: media.id,
            title: media.title.clone(),
            mime_type: media.mime_type.clone(),
            mime_class: MimeClass::from_mime(&media.mime_type),
            remote_key: remote_key(&self.upload_dir, &local_path, &self.root_dir),
            local_path,
            guid: media.guid.clone(),
        };
        Ok((media, attachment))
    }

    async fn try_process(&self, attachment_id: i64, started: Instant) -> AppResult<ProcessResult> {
        let (media, attachment) = self.resolve(attachment_id).await?;
        let class = attachment.mime_class;

        let has_file = media.file.as_deref().is_some_and(|f| !f.is_empty());
        let local_exists = has_file && is_file(&attachment.local_path).await;

        let mut fetched = false;
        if !local_exists {
            fetched = true;
            let status = if has_file {
                self.store
                    .get(&attachment.remote_key, &attachment.local_path)
                    .await?
            } else {
                404
            };

            if !(200..300).contains(&status) {
                self.registry.add(class, attachment.id).await?;
                return Ok(ProcessResult::failure(format!(
                    "Both local and remote files are missing. Unable to resize. ({})",
                    attachment.guid
                )));
            }
        }

        let regenerate = class == MimeClass::Image
            || (!fetched && !self.store.exists(&attachment.remote_key).await?);
        if regenerate {
            let metadata = match self
                .renditions
                .regenerate(&media, &attachment.local_path)
                .await
            {
                Ok(metadata) => metadata,
                Err(e) if e.is_retryable() => return Err(e),
                Err(e) => {
                    self.registry.add(class, attachment.id).await?;
                    return Ok(ProcessResult::failure(e.message));
                }
            };

            if is_empty_metadata(&metadata) {
                self.registry.add(class, attachment.id).await?;
                return Ok(ProcessResult::failure("Unknown failure reason."));
            }
            self.library
                .update_metadata(attachment.id, &metadata)
                .await?;
        }

        self.progress.record(class, attachment.id).await?;
        self.registry.remove(class, attachment.id).await?;

        let verb = match class {
            MimeClass::Image => "resized",
            MimeClass::Other => "synchronised",
        };
        Ok(ProcessResult::success(format!(
            "{} (ID {}) was successfully {verb} in {:.3} seconds.",
            attachment.title,
            attachment.id,
            started.elapsed().as_secs_f64()
        )))
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

fn is_empty_metadata(metadata: &serde_json::Value) -> bool {
    match metadata {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use stateless_core::error::ErrorKind;
    use stateless_core::traits::object_store::{ObjectRecord, PutObject};
    use stateless_database::memory::{MemoryMediaLibrary, MemoryOptionStore};
    use stateless_storage::providers::MemoryObjectStore;

    use crate::locks::KeyedLocks;

    #[derive(Debug)]
    struct FakeRenditions {
        result: Result<serde_json::Value, AppError>,
        calls: AtomicUsize,
    }

    impl FakeRenditions {
        fn returning(result: Result<serde_json::Value, AppError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RenditionGenerator for FakeRenditions {
        async fn regenerate(
            &self,
            _attachment: &MediaAttachment,
            _path: &Path,
        ) -> AppResult<serde_json::Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        upload_dir: PathBuf,
        library: Arc<MemoryMediaLibrary>,
        store: Arc<MemoryObjectStore>,
        renditions: Arc<FakeRenditions>,
        processor: AttachmentProcessor,
    }

    fn fixture(result: Result<serde_json::Value, AppError>) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let upload_dir = dir.path().to_path_buf();
        let library = Arc::new(MemoryMediaLibrary::new());
        let store = Arc::new(MemoryObjectStore::new("media"));
        let renditions = FakeRenditions::returning(result);
        let options = Arc::new(MemoryOptionStore::new());
        let locks = Arc::new(KeyedLocks::new());
        let config = StorageConfig {
            upload_dir: upload_dir.to_string_lossy().into_owned(),
            ..StorageConfig::default()
        };

        let processor = AttachmentProcessor::new(
            library.clone(),
            store.clone(),
            renditions.clone(),
            FailedAttachmentRegistry::new(options.clone(), locks.clone()),
            ProgressMarker::new(options, locks),
            &config,
        );
        Fixture {
            _dir: dir,
            upload_dir,
            library,
            store,
            renditions,
            processor,
        }
    }

    fn write_file(fx: &Fixture, relative: &str) {
        let path = fx.upload_dir.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"content").unwrap();
    }

    fn sizes() -> serde_json::Value {
        json!({ "width": 10, "height": 10, "file": "a.png", "sizes": {} })
    }

    #[tokio::test]
    async fn test_invalid_attachment_id_mutates_nothing() {
        let fx = fixture(Ok(sizes()));
        fx.library
            .insert(MediaAttachment {
                id: 5,
                kind: "post".to_string(),
                title: "Not media".to_string(),
                mime_type: "image/png".to_string(),
                file: Some("a.png".to_string()),
                guid: String::new(),
            })
            .await;

        for id in [5, 404] {
            let result = fx.processor.process(id).await;
            assert!(!result.ok);
            assert_eq!(
                result.message,
                format!("Failed resize: {id} is an invalid attachment ID.")
            );
        }

        for class in [MimeClass::Image, MimeClass::Other] {
            assert!(fx.processor.registry().list(class).await.unwrap().is_empty());
            assert!(fx.processor.progress().first_processed(class).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_missing_everywhere_registers_once() {
        let fx = fixture(Ok(sizes()));
        let id = fx
            .library
            .create("Gone", "image/png", "2024/gone.png", "https://blog/gone.png")
            .await;

        for _ in 0..2 {
            let result = fx.processor.process(id).await;
            assert!(!result.ok);
            assert_eq!(
                result.message,
                "Both local and remote files are missing. Unable to resize. (https://blog/gone.png)"
            );
        }

        assert_eq!(
            fx.processor.registry().list(MimeClass::Image).await.unwrap(),
            vec![id]
        );
        assert!(fx.processor.registry().list(MimeClass::Other).await.unwrap().is_empty());
        assert_eq!(fx.renditions.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetches_missing_local_file_and_self_heals() {
        let fx = fixture(Ok(sizes()));
        let id = fx.library.create("Photo", "image/png", "2024/a.png", "").await;
        fx.processor.registry().add(MimeClass::Image, id).await.unwrap();
        fx.store.insert("2024/a.png", "image/png", &b"png"[..]).await;

        let result = fx.processor.process(id).await;

        assert!(result.ok, "{}", result.message);
        assert!(result.message.starts_with(&format!("Photo (ID {id}) was successfully resized in")));
        assert!(fx.upload_dir.join("2024/a.png").exists());
        assert!(fx.processor.registry().list(MimeClass::Image).await.unwrap().is_empty());
        assert_eq!(fx.library.metadata(id).await, Some(sizes()));
    }

    #[tokio::test]
    async fn test_other_already_in_bucket_skips_regeneration() {
        let fx = fixture(Ok(sizes()));
        let id = fx.library.create("Manual", "application/pdf", "manual.pdf", "").await;
        write_file(&fx, "manual.pdf");
        fx.store.insert("manual.pdf", "application/pdf", &b"pdf"[..]).await;

        let result = fx.processor.process(id).await;

        assert!(result.ok);
        assert!(result.message.contains("was successfully synchronised in"));
        assert_eq!(fx.renditions.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            fx.processor.progress().last_processed(MimeClass::Other).await.unwrap(),
            Some(id)
        );
    }

    #[tokio::test]
    async fn test_other_missing_from_bucket_is_regenerated() {
        let fx = fixture(Ok(json!({ "file": "manual.pdf", "filesize": 7 })));
        let id = fx.library.create("Manual", "application/pdf", "manual.pdf", "").await;
        write_file(&fx, "manual.pdf");

        assert!(fx.processor.process(id).await.ok);
        assert_eq!(fx.renditions.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_regeneration_failures_are_registered() {
        let fx = fixture(Err(AppError::processing("Failed to decode image")));
        let id = fx.library.create("Broken", "image/png", "b.png", "").await;
        write_file(&fx, "b.png");

        let result = fx.processor.process(id).await;
        assert!(!result.ok);
        assert_eq!(result.message, "Failed to decode image");
        assert_eq!(
            fx.processor.registry().list(MimeClass::Image).await.unwrap(),
            vec![id]
        );
        assert!(fx.processor.progress().first_processed(MimeClass::Image).await.unwrap().is_none());

        let empty = fixture(Ok(json!({})));
        let id = empty.library.create("Empty", "image/png", "e.png", "").await;
        write_file(&empty, "e.png");
        let result = empty.processor.process(id).await;
        assert_eq!(result.message, "Unknown failure reason.");
        assert_eq!(
            empty.processor.registry().list(MimeClass::Image).await.unwrap(),
            vec![id]
        );
    }

    #[tokio::test]
    async fn test_unavailable_rendition_upload_is_not_registered() {
        let fx = fixture(Err(AppError::remote_unavailable(
            "Object store request timed out",
        )));
        let id = fx.library.create("Photo", "image/png", "p.png", "").await;
        write_file(&fx, "p.png");

        let result = fx.processor.process(id).await;

        assert!(!result.ok);
        assert_eq!(result.message, "Object store request timed out");
        assert!(fx.processor.registry().list(MimeClass::Image).await.unwrap().is_empty());
        assert!(fx.processor.progress().first_processed(MimeClass::Image).await.unwrap().is_none());
    }

    /// Bucket that answers every download with an outage.
    #[derive(Debug)]
    struct UnavailableBucket;

    #[async_trait]
    impl ObjectStore for UnavailableBucket {
        fn provider_type(&self) -> &str {
            "unavailable"
        }

        fn bucket(&self) -> &str {
            "media"
        }

        async fn put(&self, _request: PutObject) -> AppResult<ObjectRecord> {
            Err(AppError::remote_unavailable("Object store upload failed with HTTP 503"))
        }

        async fn exists(&self, _name: &str) -> AppResult<bool> {
            Err(AppError::remote_unavailable("Object store lookup failed with HTTP 503"))
        }

        async fn record(&self, _name: &str) -> AppResult<Option<ObjectRecord>> {
            Err(AppError::remote_unavailable("Object store lookup failed with HTTP 503"))
        }

        async fn get(&self, _name: &str, _save_to: &Path) -> AppResult<u16> {
            Err(AppError::remote_unavailable("Object store download failed with HTTP 503"))
        }

        async fn delete(&self, _name: &str) -> AppResult<bool> {
            Ok(false)
        }

        async fn is_connected(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_bucket_outage_during_fetch_is_not_registered() {
        let fx = fixture(Ok(sizes()));
        let options = Arc::new(MemoryOptionStore::new());
        let locks = Arc::new(KeyedLocks::new());
        let processor = AttachmentProcessor::new(
            fx.library.clone(),
            Arc::new(UnavailableBucket),
            fx.renditions.clone(),
            FailedAttachmentRegistry::new(options.clone(), locks.clone()),
            ProgressMarker::new(options, locks),
            &StorageConfig {
                upload_dir: fx.upload_dir.to_string_lossy().into_owned(),
                ..StorageConfig::default()
            },
        );
        let id = fx
            .library
            .create("Manual", "application/pdf", "manual.pdf", "https://blog/manual.pdf")
            .await;

        let result = processor.process(id).await;

        assert!(!result.ok);
        assert_eq!(result.message, "Object store download failed with HTTP 503");
        assert!(processor.registry().list(MimeClass::Other).await.unwrap().is_empty());
        assert_eq!(fx.renditions.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_progress_follows_processing_order() {
        let fx = fixture(Ok(sizes()));
        for id in [50, 10, 30] {
            fx.library
                .insert(MediaAttachment {
                    id,
                    kind: "attachment".to_string(),
                    title: format!("Image {id}"),
                    mime_type: "image/jpeg".to_string(),
                    file: Some(format!("{id}.jpg")),
                    guid: String::new(),
                })
                .await;
            write_file(&fx, &format!("{id}.jpg"));
            assert!(fx.processor.process(id).await.ok);
        }

        let progress = fx.processor.progress();
        assert_eq!(progress.first_processed(MimeClass::Image).await.unwrap(), Some(50));
        assert_eq!(progress.last_processed(MimeClass::Image).await.unwrap(), Some(10));
    }

    #[tokio::test]
    async fn test_resolve_derives_remote_key() {
        let fx = fixture(Ok(sizes()));
        let id = fx.library.create("Doc", "text/plain", "2024/05/doc.txt", "").await;

        let (_, attachment) = fx.processor.resolve(id).await.unwrap();
        assert_eq!(attachment.remote_key, "2024/05/doc.txt");
        assert_eq!(attachment.mime_class, MimeClass::Other);

        let err = fx.processor.resolve(999).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
