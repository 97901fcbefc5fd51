//! Rendition generator for attachment files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use image::GenericImageView;
use image::imageops::FilterType;
use serde_json::{Map, Value, json};

use stateless_core::config::StorageConfig;
use stateless_core::config::storage::RenditionSize;
use stateless_core::error::{AppError, ErrorKind};
use stateless_core::result::AppResult;
use stateless_core::traits::media::{MediaAttachment, RenditionGenerator};
use stateless_core::traits::object_store::{ObjectStore, PutObject};
use stateless_entity::attachment::MimeClass;

use crate::naming::remote_key;

/// A rendition written next to the original file.
#[derive(Debug, Clone)]
struct Rendition {
    name: String,
    path: PathBuf,
    width: u32,
    height: u32,
}

/// Resizes images to the configured sizes and uploads every produced file
/// to the object store.
#[derive(Debug, Clone)]
pub struct ImageRenditionGenerator {
    /// Destination for the original and its renditions.
    store: Arc<dyn ObjectStore>,
    /// Local upload base directory.
    upload_dir: PathBuf,
    /// Remote name prefix.
    root_dir: String,
    /// `Cache-Control` stored with every upload.
    cache_control: String,
    /// Sizes to produce.
    sizes: Vec<RenditionSize>,
}

impl ImageRenditionGenerator {
    /// Create a generator from storage configuration.
    pub fn new(store: Arc<dyn ObjectStore>, config: &StorageConfig) -> Self {
        Self {
            store,
            upload_dir: PathBuf::from(&config.upload_dir),
            root_dir: config.root_dir.clone(),
            cache_control: config.cache_control.clone(),
            sizes: config.rendition_sizes.clone(),
        }
    }

    /// Check if a MIME type can be decoded for resizing.
    pub fn is_supported(mime_type: &str) -> bool {
        matches!(
            mime_type,
            "image/jpeg" | "image/png" | "image/gif" | "image/webp" | "image/bmp" | "image/tiff"
        )
    }

    /// Name of the rendition file for a size: `{stem}-{w}x{h}.{ext}`.
    pub fn rendition_file_name(source: &Path, width: u32, height: u32) -> String {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match source.extension() {
            Some(ext) => format!("{stem}-{width}x{height}.{}", ext.to_string_lossy()),
            None => format!("{stem}-{width}x{height}"),
        }
    }

    /// Decode `source` and write one file per size smaller than the original.
    fn resize_all(
        source: &Path,
        sizes: &[RenditionSize],
    ) -> AppResult<((u32, u32), Vec<Rendition>)> {
        let img = image::open(source).map_err(|e| {
            AppError::with_source(
                ErrorKind::Processing,
                format!("Failed to decode image '{}': {e}", source.display()),
                e,
            )
        })?;
        let (orig_w, orig_h) = img.dimensions();

        let mut renditions = Vec::new();
        for size in sizes {
            if orig_w <= size.width && orig_h <= size.height {
                continue;
            }

            let resized = if size.crop {
                img.resize_to_fill(size.width, size.height, FilterType::Lanczos3)
            } else {
                img.resize(size.width, size.height, FilterType::Lanczos3)
            };
            let (w, h) = resized.dimensions();
            let path = source.with_file_name(Self::rendition_file_name(source, w, h));
            resized.save(&path).map_err(|e| {
                AppError::with_source(
                    ErrorKind::Processing,
                    format!("Failed to write rendition '{}'", path.display()),
                    e,
                )
            })?;

            renditions.push(Rendition {
                name: size.name.clone(),
                path,
                width: w,
                height: h,
            });
        }

        Ok(((orig_w, orig_h), renditions))
    }

    async fn upload(
        &self,
        attachment: &MediaAttachment,
        path: &Path,
        extra: Map<String, Value>,
    ) -> AppResult<()> {
        let mut request = PutObject::new(
            remote_key(&self.upload_dir, path, &self.root_dir),
            path,
            &attachment.mime_type,
        );
        request.metadata = extra;
        request
            .metadata
            .insert("object-id".to_string(), json!(attachment.id.to_string()));
        request.cache_control = Some(self.cache_control.clone());

        let record = self.store.put(request).await?;
        tracing::debug!(
            attachment_id = attachment.id,
            name = %record.name,
            bucket = %record.bucket,
            "Uploaded file"
        );
        Ok(())
    }
}

#[async_trait]
impl RenditionGenerator for ImageRenditionGenerator {
    async fn regenerate(&self, attachment: &MediaAttachment, path: &Path) -> AppResult<Value> {
        let filesize = tokio::fs::metadata(path).await?.len();
        let relative = remote_key(&self.upload_dir, path, "");

        let is_image = MimeClass::from_mime(&attachment.mime_type) == MimeClass::Image;
        if !is_image || !Self::is_supported(&attachment.mime_type) {
            self.upload(attachment, path, Map::new()).await?;
            return Ok(json!({ "file": relative, "filesize": filesize }));
        }

        let source = path.to_path_buf();
        let sizes = self.sizes.clone();
        let ((width, height), renditions) =
            tokio::task::spawn_blocking(move || Self::resize_all(&source, &sizes))
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Internal, "Rendition task panicked", e)
                })??;

        let mut original_meta = Map::new();
        original_meta.insert("width".to_string(), json!(width));
        original_meta.insert("height".to_string(), json!(height));
        self.upload(attachment, path, original_meta).await?;

        let mut sizes = Map::new();
        for rendition in &renditions {
            let mut meta = Map::new();
            meta.insert("width".to_string(), json!(rendition.width));
            meta.insert("height".to_string(), json!(rendition.height));
            meta.insert("child-of".to_string(), json!(attachment.id.to_string()));
            self.upload(attachment, &rendition.path, meta).await?;

            let file = rendition
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            sizes.insert(
                rendition.name.clone(),
                json!({
                    "file": file,
                    "width": rendition.width,
                    "height": rendition.height,
                    "mime-type": attachment.mime_type,
                }),
            );
        }

        tracing::debug!(
            attachment_id = attachment.id,
            renditions = renditions.len(),
            "Regenerated renditions"
        );

        Ok(json!({
            "width": width,
            "height": height,
            "file": relative,
            "filesize": filesize,
            "sizes": sizes,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MemoryObjectStore;

    fn attachment(mime_type: &str) -> MediaAttachment {
        MediaAttachment {
            id: 7,
            kind: "attachment".to_string(),
            title: "Sunset".to_string(),
            mime_type: mime_type.to_string(),
            file: Some("2024/05/sunset.png".to_string()),
            guid: "https://blog.example.com/uploads/2024/05/sunset.png".to_string(),
        }
    }

    fn generator(store: Arc<MemoryObjectStore>, upload_dir: &Path) -> ImageRenditionGenerator {
        let config = StorageConfig {
            upload_dir: upload_dir.to_string_lossy().into_owned(),
            ..StorageConfig::default()
        };
        ImageRenditionGenerator::new(store, &config)
    }

    #[test]
    fn test_rendition_file_name() {
        assert_eq!(
            ImageRenditionGenerator::rendition_file_name(Path::new("/u/2024/sunset.png"), 150, 100),
            "sunset-150x100.png"
        );
    }

    #[tokio::test]
    async fn test_regenerate_image_writes_and_uploads_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2024/05/sunset.png");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        image::RgbImage::new(400, 200).save(&path).unwrap();

        let store = Arc::new(MemoryObjectStore::new("media"));
        let metadata = generator(store.clone(), dir.path())
            .regenerate(&attachment("image/png"), &path)
            .await
            .unwrap();

        assert_eq!(metadata["width"], 400);
        assert_eq!(metadata["file"], "2024/05/sunset.png");
        assert_eq!(metadata["sizes"]["thumbnail"]["file"], "sunset-150x150.png");
        assert_eq!(metadata["sizes"]["medium"]["width"], 300);
        assert!(metadata["sizes"].get("large").is_none());

        assert!(dir.path().join("2024/05/sunset-150x150.png").exists());
        assert!(store.exists("2024/05/sunset.png").await.unwrap());
        assert!(store.exists("2024/05/sunset-300x150.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_regenerate_other_uploads_original_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manual.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        let store = Arc::new(MemoryObjectStore::new("media"));
        let metadata = generator(store.clone(), dir.path())
            .regenerate(&attachment("application/pdf"), &path)
            .await
            .unwrap();

        assert_eq!(metadata, json!({ "file": "manual.pdf", "filesize": 8 }));
        assert!(store.exists("manual.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn test_undecodable_image_is_processing_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        let store = Arc::new(MemoryObjectStore::new("media"));
        let err = generator(store, dir.path())
            .regenerate(&attachment("image/png"), &path)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Processing);
    }
}
