use vitrine_core::AppError;
use vitrine_storage::StorageError;

use crate::validator::ValidationError;

/// Why one image could not be turned into stored media.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Failed to store image: {0}")]
    Storage(#[from] StorageError),

    #[error("Image processing task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for ImageError {
    fn from(err: tokio::task::JoinError) -> Self {
        ImageError::Task(err.to_string())
    }
}

impl From<image::ImageError> for ImageError {
    fn from(err: image::ImageError) -> Self {
        ImageError::Decode(err.to_string())
    }
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Storage(storage) => storage.into(),
            other => AppError::ImageProcessing(other.to_string()),
        }
    }
}
