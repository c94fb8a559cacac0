//! Shared key and URL derivation for media files.
//!
//! Key format: `images/{entity}/{filename}`; URL format: `/media/{key}`.

use crate::traits::{StorageError, StorageResult};

/// Public URL prefix under which the media root is served.
pub const MEDIA_URL_PREFIX: &str = "/media/";

fn check_segment(kind: &str, segment: &str) -> StorageResult<()> {
    if segment.is_empty()
        || segment == "."
        || segment.contains("..")
        || segment.contains('/')
        || segment.contains('\\')
    {
        return Err(StorageError::InvalidKey(format!(
            "{} '{}' contains invalid characters",
            kind, segment
        )));
    }
    Ok(())
}

/// Storage key for an entity-scoped media file.
pub fn media_key(entity: &str, filename: &str) -> StorageResult<String> {
    check_segment("Entity", entity)?;
    check_segment("Filename", filename)?;
    Ok(format!("images/{}/{}", entity, filename))
}

/// Public URL for an entity-scoped media file.
pub fn media_url(entity: &str, filename: &str) -> StorageResult<String> {
    Ok(format!("{}{}", MEDIA_URL_PREFIX, media_key(entity, filename)?))
}

/// Inverse of [`media_url`]: the storage key of a URL served from the media
/// root, or `None` for anything hosted elsewhere.
pub fn key_from_url(url: &str) -> Option<&str> {
    url.strip_prefix(MEDIA_URL_PREFIX)
        .filter(|key| key.starts_with("images/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_keys_and_urls() {
        assert_eq!(
            media_key("products", "omega-1a2b3c4d.webp").unwrap(),
            "images/products/omega-1a2b3c4d.webp"
        );
        assert_eq!(
            media_url("brands", "tissot-00ff00ff-thumb.webp").unwrap(),
            "/media/images/brands/tissot-00ff00ff-thumb.webp"
        );
    }

    #[test]
    fn rejects_traversal_segments() {
        assert!(media_key("..", "x.webp").is_err());
        assert!(media_key("products", "../x.webp").is_err());
        assert!(media_key("products", "a/b.webp").is_err());
        assert!(media_key("", "x.webp").is_err());
    }

    #[test]
    fn strips_media_prefix_from_urls() {
        assert_eq!(
            key_from_url("/media/images/products/a.webp"),
            Some("images/products/a.webp")
        );
        assert_eq!(key_from_url("https://cdn.example/a.webp"), None);
        assert_eq!(key_from_url("/media/other/a.webp"), None);
    }
}
