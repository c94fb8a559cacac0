//! Decode, resize and re-encode one uploaded image into its stored variants.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use vitrine_core::ImageSettings;

use crate::encoder::encode_webp;
use crate::error::ImageError;
use crate::naming::content_hash;

/// Output of the pipeline for one source image.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    /// Main variant, WebP.
    pub buffer: Vec<u8>,
    /// Square thumbnail, WebP.
    pub thumb_buffer: Vec<u8>,
    /// Digest of the original upload, not of the re-encoded output.
    pub hash: String,
    pub width: u32,
    pub height: u32,
}

fn decode(data: &[u8]) -> Result<DynamicImage, ImageError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageError::Decode(e.to_string()))?;
    Ok(reader.decode()?)
}

/// Shrinks to fit the box, never enlarges.
fn fit_within(img: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= max_width && height <= max_height {
        return img;
    }
    img.resize(max_width, max_height, FilterType::Lanczos3)
}

pub fn process_image(data: &[u8], settings: &ImageSettings) -> Result<ProcessedImage, ImageError> {
    let img = decode(data)?;
    let (source_width, source_height) = img.dimensions();

    let thumb = img.resize_to_fill(settings.thumb_size, settings.thumb_size, FilterType::Lanczos3);
    let thumb_quality = settings.quality.min(settings.thumb_quality);
    let thumb_buffer = encode_webp(&thumb, thumb_quality)?;

    let main = fit_within(img, settings.max_width, settings.max_height);
    let (width, height) = main.dimensions();
    let buffer = encode_webp(&main, settings.quality)?;

    tracing::debug!(
        source_width,
        source_height,
        width,
        height,
        size_bytes = buffer.len(),
        thumb_size_bytes = thumb_buffer.len(),
        "Image processed"
    );

    Ok(ProcessedImage {
        buffer,
        thumb_buffer,
        hash: content_hash(data),
        width,
        height,
    })
}
