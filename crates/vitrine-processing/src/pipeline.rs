//! Validation, processing and persistence chained for a single image.

use vitrine_core::ImageSettings;
use vitrine_storage::MediaStore;

use crate::error::ImageError;
use crate::naming::{build_filename, THUMB_SUFFIX};
use crate::transformer::{process_image, ProcessedImage};
use crate::validator::validate_image;

/// Public URLs of a persisted image and its thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub url: String,
    pub thumb_url: String,
    pub hash: String,
    pub width: u32,
    pub height: u32,
}

/// Persist both variants of an already processed image under `entity`.
pub async fn store_image(
    store: &dyn MediaStore,
    entity: &str,
    slug: &str,
    processed: &ProcessedImage,
) -> Result<StoredImage, ImageError> {
    let main_name = build_filename(slug, &processed.hash, "");
    let thumb_name = build_filename(slug, &processed.hash, THUMB_SUFFIX);

    let url = store.save_media(entity, &main_name, &processed.buffer).await?;
    let thumb_url = store
        .save_media(entity, &thumb_name, &processed.thumb_buffer)
        .await?;

    Ok(StoredImage {
        url,
        thumb_url,
        hash: processed.hash.clone(),
        width: processed.width,
        height: processed.height,
    })
}

/// [`process_image`] on the blocking pool. Resize and encode are CPU-bound and
/// must not hold an async worker.
pub async fn process_image_blocking(
    data: Vec<u8>,
    settings: ImageSettings,
) -> Result<ProcessedImage, ImageError> {
    tokio::task::spawn_blocking(move || process_image(&data, &settings)).await?
}

/// Validate, process and store raw upload bytes named `filename`.
/// The filename stem becomes the slug part of the stored name.
pub async fn ingest_image(
    store: &dyn MediaStore,
    entity: &str,
    filename: &str,
    data: &[u8],
    settings: &ImageSettings,
) -> Result<StoredImage, ImageError> {
    validate_image(filename, None, data.len(), settings)?;
    let processed = process_image_blocking(data.to_vec(), settings.clone()).await?;

    let stem = std::path::Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    store_image(store, entity, stem, &processed).await
}
