//! Image uploads
//!
//! Profile photos and event images are stored as objects addressed by a
//! slash-separated path and read back through a URL.

use crate::error::{AppError, AppResult};
use crate::utils::image_object_path;
use async_trait::async_trait;
use log::debug;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use url::Url;

const PROFILE_FOLDER: &str = "profiles";
const EVENT_FOLDER: &str = "events";

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(&self, path: &str, bytes: &[u8]) -> AppResult<()>;

    async fn download_url(&self, path: &str) -> AppResult<String>;
}

/// Object storage backed by a directory on this machine. URLs are `file://`.
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let relative = Path::new(path);
        let is_plain = !path.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain {
            return Err(AppError::invalid_input(format!("invalid object path '{}'", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn put(&self, path: &str, bytes: &[u8]) -> AppResult<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::storage(e.to_string()))?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| AppError::storage(e.to_string()))?;
        debug!("Stored {} bytes at {}", bytes.len(), target.display());
        Ok(())
    }

    async fn download_url(&self, path: &str) -> AppResult<String> {
        let target = self.resolve(path)?;
        let absolute = tokio::fs::canonicalize(&target)
            .await
            .map_err(|_| AppError::not_found(format!("object {}", path)))?;
        Url::from_file_path(&absolute)
            .map(String::from)
            .map_err(|_| AppError::storage(format!("no URL for {}", absolute.display())))
    }
}

#[derive(Clone)]
pub struct StorageRepository {
    storage: Arc<dyn ObjectStorage>,
}

impl StorageRepository {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    /// Uploads `bytes` to `path` and returns the URL it can be read from.
    pub async fn upload_image(&self, path: &str, bytes: &[u8]) -> AppResult<String> {
        if bytes.is_empty() {
            return Err(AppError::invalid_input("Image is empty"));
        }

        self.storage
            .put(path, bytes)
            .await
            .map_err(|e| AppError::storage(format!("Image upload failed: {}", e)))?;

        self.storage
            .download_url(path)
            .await
            .map_err(|e| AppError::storage(format!("Getting URL failed: {}", e)))
    }

    pub async fn upload_profile_image(&self, user_id: &str, bytes: &[u8]) -> AppResult<String> {
        self.upload_image(&image_object_path(PROFILE_FOLDER, user_id), bytes).await
    }

    pub async fn upload_event_image(&self, user_id: &str, bytes: &[u8]) -> AppResult<String> {
        self.upload_image(&image_object_path(EVENT_FOLDER, user_id), bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repository(dir: &TempDir) -> StorageRepository {
        StorageRepository::new(Arc::new(LocalObjectStorage::new(dir.path())))
    }

    #[tokio::test]
    async fn test_upload_event_image_returns_file_url() {
        let dir = TempDir::new().unwrap();
        let url = repository(&dir).upload_event_image("u1", b"jpeg bytes").await.unwrap();

        assert!(url.starts_with("file://"));
        assert!(url.contains("/events/u1/"));
        assert!(url.ends_with(".jpg"));

        let path = Url::parse(&url).unwrap().to_file_path().unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"jpeg bytes");
    }

    #[tokio::test]
    async fn test_profile_images_get_distinct_paths() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir);
        let first = repo.upload_profile_image("u1", b"a").await.unwrap();
        let second = repo.upload_profile_image("u1", b"b").await.unwrap();
        assert!(first.contains("/profiles/u1/"));
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_empty_image_is_rejected() {
        let dir = TempDir::new().unwrap();
        let result = repository(&dir).upload_event_image("u1", b"").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_escaping_paths_are_rejected() {
        let dir = TempDir::new().unwrap();
        let storage = LocalObjectStorage::new(dir.path());
        for path in ["../outside.jpg", "/etc/passwd", "", "events/../../x.jpg"] {
            assert!(storage.put(path, b"x").await.is_err(), "accepted {:?}", path);
        }
    }

    #[tokio::test]
    async fn test_upload_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let result = repository(&dir).upload_image("../x.jpg", b"x").await;
        match result {
            Err(AppError::Storage(msg)) => assert!(msg.starts_with("Image upload failed")),
            other => panic!("expected storage error, got {:?}", other.map(|_| ())),
        }
    }
}
