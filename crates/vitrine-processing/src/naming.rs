use sha2::{Digest, Sha256};
use vitrine_core::slug::transliterate;
use vitrine_storage::key_from_url;

/// Suffix appended to the thumbnail variant's filename.
pub const THUMB_SUFFIX: &str = "-thumb";

const MAX_SLUG_LEN: usize = 60;
const FALLBACK_SLUG: &str = "image";

/// First 8 hex chars of the SHA-256 of the source bytes.
pub fn content_hash(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    hex::encode(&digest[..4])
}

/// `<slug>-<hash><suffix>.webp` with the slug reduced to `[a-z0-9_-]`.
pub fn build_filename(slug: &str, hash: &str, suffix: &str) -> String {
    let mut clean = String::with_capacity(slug.len());
    for ch in transliterate(slug).chars() {
        let ch = if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
            ch
        } else {
            '-'
        };
        if ch == '-' && clean.ends_with('-') {
            continue;
        }
        clean.push(ch);
    }

    let mut clean: String = clean.trim_matches('-').chars().take(MAX_SLUG_LEN).collect();
    while clean.ends_with('-') {
        clean.pop();
    }
    if clean.is_empty() {
        clean.push_str(FALLBACK_SLUG);
    }

    format!("{}-{}{}.webp", clean, hash, suffix)
}

/// Thumbnail URL for a main-variant URL written by the pipeline. `None` for
/// externally hosted images and for URLs that already are thumbnails.
pub fn thumb_url_for(url: &str) -> Option<String> {
    key_from_url(url)?;
    let stem = url.strip_suffix(".webp")?;
    if stem.ends_with(THUMB_SUFFIX) {
        return None;
    }
    Some(format!("{}{}.webp", stem, THUMB_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_eight_hex_chars_and_deterministic() {
        let a = content_hash(b"same bytes");
        let b = content_hash(b"same bytes");
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, content_hash(b"other bytes"));
    }

    #[test]
    fn sanitizes_and_suffixes() {
        assert_eq!(
            build_filename("T035.617.11.051.00", "1a2b3c4d", ""),
            "t035-617-11-051-00-1a2b3c4d.webp"
        );
        assert_eq!(
            build_filename("rolex_sub", "1a2b3c4d", THUMB_SUFFIX),
            "rolex_sub-1a2b3c4d-thumb.webp"
        );
        assert_eq!(build_filename("Часы", "00000000", ""), "chasy-00000000.webp");
    }

    #[test]
    fn falls_back_and_truncates() {
        assert_eq!(build_filename("!!!", "abcdef01", ""), "image-abcdef01.webp");

        let long = "a".repeat(100);
        let name = build_filename(&long, "abcdef01", "");
        assert_eq!(name, format!("{}-abcdef01.webp", "a".repeat(60)));
    }

    #[test]
    fn derives_thumbnail_urls_for_hosted_images_only() {
        assert_eq!(
            thumb_url_for("/media/images/products/omega-1a2b3c4d.webp").as_deref(),
            Some("/media/images/products/omega-1a2b3c4d-thumb.webp")
        );
        assert_eq!(thumb_url_for("/media/images/products/omega-1a2b3c4d-thumb.webp"), None);
        assert_eq!(thumb_url_for("https://cdn.example/omega.webp"), None);
        assert_eq!(thumb_url_for("/media/images/products/legacy.jpg"), None);
    }
}
