//! Vitrine Storage Library
//!
//! Content-addressed media storage for catalog images.
//!
//! # Key format
//!
//! Every stored file lives under `images/{entity}/{filename}` relative to the
//! media root and is served at `/media/images/{entity}/{filename}`. Keys must
//! not contain `..`, a leading `/`, or path separators inside the entity or
//! filename segments. Key and URL derivation is centralized in the `keys`
//! module.

pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use keys::{key_from_url, media_key, media_url, MEDIA_URL_PREFIX};
pub use local::LocalMediaStore;
pub use traits::{MediaStore, StorageError, StorageResult};
