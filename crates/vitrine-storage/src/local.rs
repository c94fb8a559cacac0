use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::keys::{media_key, MEDIA_URL_PREFIX};
use crate::traits::{MediaStore, StorageError, StorageResult};

/// Local filesystem media store rooted at the configured media directory.
#[derive(Clone, Debug)]
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    /// Create a store, making sure the media root exists.
    pub async fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create media directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(LocalMediaStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Convert a storage key to a filesystem path that stays under the root.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        let path = self.root.join(key);
        if path.strip_prefix(&self.root).is_err() {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside media directory".to_string(),
            ));
        }

        Ok(path)
    }

    fn path_for(&self, entity: &str, filename: &str) -> StorageResult<(String, PathBuf)> {
        let key = media_key(entity, filename)?;
        let path = self.key_to_path(&key)?;
        Ok((key, path))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn save_media(&self, entity: &str, filename: &str, data: &[u8]) -> StorageResult<String> {
        let (key, path) = self.path_for(entity, filename)?;
        let url = format!("{}{}", MEDIA_URL_PREFIX, key);

        if fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!(key = %key, "Media file already stored, skipping write");
            return Ok(url);
        }

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(data).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Media file stored"
        );

        Ok(url)
    }

    async fn read_media(&self, entity: &str, filename: &str) -> StorageResult<Vec<u8>> {
        let (key, path) = self.path_for(entity, filename)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key));
        }

        fs::read(&path).await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })
    }

    async fn delete_media(&self, entity: &str, filename: &str) -> StorageResult<()> {
        let (key, path) = self.path_for(entity, filename)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(key = %key, "Media file deleted");

        Ok(())
    }

    async fn exists(&self, entity: &str, filename: &str) -> StorageResult<bool> {
        let (_, path) = self.path_for(entity, filename)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_save_and_read_media() {
        let dir = tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path()).await.unwrap();

        let url = store
            .save_media("products", "omega-1a2b3c4d.webp", b"webp bytes")
            .await
            .unwrap();

        assert_eq!(url, "/media/images/products/omega-1a2b3c4d.webp");
        assert!(dir
            .path()
            .join("images/products/omega-1a2b3c4d.webp")
            .exists());

        let data = store
            .read_media("products", "omega-1a2b3c4d.webp")
            .await
            .unwrap();
        assert_eq!(data, b"webp bytes");
    }

    #[tokio::test]
    async fn test_save_is_a_noop_when_file_exists() {
        let dir = tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path()).await.unwrap();

        store
            .save_media("brands", "tissot-00000000.webp", b"first")
            .await
            .unwrap();
        store
            .save_media("brands", "tissot-00000000.webp", b"second")
            .await
            .unwrap();

        let data = store
            .read_media("brands", "tissot-00000000.webp")
            .await
            .unwrap();
        assert_eq!(data, b"first");
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path()).await.unwrap();

        let result = store.read_media("..", "passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = store.save_media("products", "../../x.webp", b"x").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_delete_and_exists() {
        let dir = tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path()).await.unwrap();

        assert!(store.delete_media("products", "missing.webp").await.is_ok());

        store
            .save_media("products", "a-12345678.webp", b"x")
            .await
            .unwrap();
        assert!(store.exists("products", "a-12345678.webp").await.unwrap());

        store
            .delete_media("products", "a-12345678.webp")
            .await
            .unwrap();
        assert!(!store.exists("products", "a-12345678.webp").await.unwrap());

        let result = store.read_media("products", "a-12345678.webp").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }
}
