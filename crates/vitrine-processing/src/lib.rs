//! Vitrine Processing Library
//!
//! The media pipeline: validation of uploaded images, resize + WebP
//! re-encoding with a square thumbnail, content-hash filenames and
//! persistence through a [`vitrine_storage::MediaStore`].

pub mod encoder;
pub mod error;
pub mod naming;
pub mod pipeline;
pub mod transformer;
pub mod validator;

pub use error::ImageError;
pub use naming::{build_filename, content_hash, thumb_url_for, THUMB_SUFFIX};
pub use pipeline::{ingest_image, process_image_blocking, store_image, StoredImage};
pub use transformer::{process_image, ProcessedImage};
pub use validator::{
    content_type_for, is_image_filename, validate_image, ImageValidator, ValidationError,
    IMAGE_EXTENSIONS,
};
