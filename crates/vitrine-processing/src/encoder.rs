use image::{DynamicImage, GenericImageView};

use crate::error::ImageError;

/// Lossy WebP encoding at the given quality (0-100).
pub fn encode_webp(img: &DynamicImage, quality: f32) -> Result<Vec<u8>, ImageError> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(ImageError::Encode("image has no pixels".to_string()));
    }

    // Convert to RGBA for WebP encoding
    let rgba_img = img.to_rgba8();

    let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
    let webp_data = encoder.encode(quality.clamp(0.0, 100.0));

    Ok(webp_data.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encodes_riff_webp() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 32, Rgba([10, 20, 30, 255])));
        let data = encode_webp(&img, 80.0).unwrap();

        assert_eq!(&data[0..4], b"RIFF");
        assert_eq!(&data[8..12], b"WEBP");
    }
}
