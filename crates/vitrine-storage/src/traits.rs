//! Media store abstraction trait

use async_trait::async_trait;
use thiserror::Error;
use vitrine_core::AppError;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("Media file {}", key)),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Content-addressed media store keyed by entity subdirectory + filename.
///
/// Filenames carry a content hash, so writing the same name twice is a no-op.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist `data` and return its public URL.
    async fn save_media(&self, entity: &str, filename: &str, data: &[u8]) -> StorageResult<String>;

    async fn read_media(&self, entity: &str, filename: &str) -> StorageResult<Vec<u8>>;

    /// Removing a file that does not exist is not an error.
    async fn delete_media(&self, entity: &str, filename: &str) -> StorageResult<()>;

    async fn exists(&self, entity: &str, filename: &str) -> StorageResult<bool>;
}
