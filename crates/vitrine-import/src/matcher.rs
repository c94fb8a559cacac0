//! Matching archive image filenames to existing products.
//!
//! A primary image is named after the product (`<sku>.jpg`, `<slug>.png`);
//! gallery images add a numeric suffix to the primary's stem
//! (`<stem>_<n>.jpg`) and follow their primary.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use sqlx::SqliteConnection;
use vitrine_core::slug::slugify;
use vitrine_core::AppError;
use vitrine_db::{NewProductImage, ProductKey, ProductRepository};
use vitrine_processing::is_image_filename;

use crate::archive::file_stem;

fn gallery_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(.+)_(\d+)$").expect("gallery pattern is valid"))
}

/// Split `<base>_<n>` into its base stem and gallery index.
pub fn gallery_suffix(stem: &str) -> Option<(&str, u32)> {
    let captures = gallery_pattern().captures(stem)?;
    let base = captures.get(1)?.as_str();
    let index = captures.get(2)?.as_str().parse().ok()?;
    Some((base, index))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedBy {
    Sku,
    Slug,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageMatch {
    pub filename: String,
    pub product_id: i64,
    pub matched_by: MatchedBy,
    pub is_gallery: bool,
    pub parent_filename: Option<String>,
    /// Numeric suffix of a gallery image.
    pub gallery_index: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    pub matched: Vec<ImageMatch>,
    pub unmatched: Vec<String>,
}

/// SKU and slug lookup over the current products.
#[derive(Debug, Default)]
pub struct ProductIndex {
    by_sku: HashMap<String, i64>,
    by_slug: HashMap<String, i64>,
}

impl ProductIndex {
    pub fn new(keys: &[ProductKey]) -> Self {
        let mut index = ProductIndex::default();
        for key in keys {
            if let Some(sku) = key.sku.as_deref().filter(|sku| !sku.is_empty()) {
                index.by_sku.insert(sku.to_string(), key.id);
            }
            index.by_slug.insert(key.slug.clone(), key.id);
        }
        index
    }

    pub async fn load(conn: &mut SqliteConnection) -> Result<Self, AppError> {
        let keys = ProductRepository::list_keys(conn).await?;
        Ok(Self::new(&keys))
    }

    /// Exact SKU, SKU with `_` read as `.`, exact slug, slugified stem.
    pub fn lookup(&self, stem: &str) -> Option<(i64, MatchedBy)> {
        if let Some(id) = self.by_sku.get(stem) {
            return Some((*id, MatchedBy::Sku));
        }
        if stem.contains('_') {
            if let Some(id) = self.by_sku.get(&stem.replace('_', ".")) {
                return Some((*id, MatchedBy::Sku));
            }
        }
        if let Some(id) = self.by_slug.get(stem) {
            return Some((*id, MatchedBy::Slug));
        }
        self.by_slug
            .get(&slugify(stem))
            .map(|id| (*id, MatchedBy::Slug))
    }

    pub fn len(&self) -> usize {
        self.by_slug.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_slug.is_empty()
    }
}

/// Match filenames to products. Non-image names, unknown stems and gallery
/// images without a matched primary end up in `unmatched`.
pub fn match_images_to_products<S: AsRef<str>>(filenames: &[S], index: &ProductIndex) -> MatchReport {
    let mut report = MatchReport::default();
    let mut primaries: HashMap<&str, usize> = HashMap::new();
    let mut galleries: Vec<(usize, &str, &str, u32)> = Vec::new();
    // Input position of each unmatched name, so the report keeps upload order.
    let mut unmatched: Vec<(usize, &str)> = Vec::new();

    for (position, filename) in filenames.iter().enumerate() {
        let filename = filename.as_ref();
        if !is_image_filename(filename) {
            unmatched.push((position, filename));
            continue;
        }

        let stem = file_stem(filename);
        if let Some((product_id, matched_by)) = index.lookup(stem) {
            primaries.insert(stem, report.matched.len());
            report.matched.push(ImageMatch {
                filename: filename.to_string(),
                product_id,
                matched_by,
                is_gallery: false,
                parent_filename: None,
                gallery_index: None,
            });
            continue;
        }

        match gallery_suffix(stem) {
            Some((base, n)) => galleries.push((position, filename, base, n)),
            None => unmatched.push((position, filename)),
        }
    }

    for (position, filename, base, n) in galleries {
        match primaries.get(base).map(|&i| report.matched[i].clone()) {
            Some(parent) => report.matched.push(ImageMatch {
                filename: filename.to_string(),
                product_id: parent.product_id,
                matched_by: parent.matched_by,
                is_gallery: true,
                parent_filename: Some(parent.filename),
                gallery_index: Some(n),
            }),
            None => unmatched.push((position, filename)),
        }
    }

    unmatched.sort_by_key(|&(position, _)| position);
    report.unmatched = unmatched
        .into_iter()
        .map(|(_, filename)| filename.to_string())
        .collect();
    report
}

/// Replace the image set of every matched product: primary first, then
/// gallery images by numeric suffix. Matches whose file failed processing
/// are absent from `image_map` and skipped; a product left with no images is
/// not touched. Returns the number of products updated.
pub async fn update_product_images(
    conn: &mut SqliteConnection,
    report: &MatchReport,
    image_map: &HashMap<String, String>,
    thumb_map: &HashMap<String, String>,
) -> Result<usize, AppError> {
    let mut by_product: BTreeMap<i64, Vec<&ImageMatch>> = BTreeMap::new();
    for image in &report.matched {
        if image_map.contains_key(&image.filename) {
            by_product.entry(image.product_id).or_default().push(image);
        }
    }

    let mut updated = 0;
    for (product_id, mut images) in by_product {
        images.sort_by_key(|image| (image.is_gallery, image.gallery_index.unwrap_or(0)));

        let rows: Vec<NewProductImage> = images
            .iter()
            .enumerate()
            .filter_map(|(position, image)| {
                Some(NewProductImage {
                    url: image_map.get(&image.filename)?.clone(),
                    thumb_url: thumb_map.get(&image.filename).cloned(),
                    alt: None,
                    is_main: position == 0,
                })
            })
            .collect();

        ProductRepository::replace_images(conn, product_id, &rows).await?;
        updated += 1;
    }

    tracing::info!(products = updated, "Product images replaced from archive");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_db::{connect_in_memory, ProductFields};

    fn key(id: i64, sku: Option<&str>, slug: &str) -> ProductKey {
        ProductKey {
            id,
            sku: sku.map(str::to_string),
            slug: slug.to_string(),
            name: slug.to_string(),
        }
    }

    fn index() -> ProductIndex {
        ProductIndex::new(&[
            key(1, None, "rolex-sub"),
            key(2, Some("T035.617.11.051.00"), "tissot-couturier"),
            key(3, Some("GA-2100"), "casio-ga-2100"),
        ])
    }

    #[test]
    fn test_gallery_suffix() {
        assert_eq!(gallery_suffix("rolex-sub_2"), Some(("rolex-sub", 2)));
        assert_eq!(gallery_suffix("a_b_10"), Some(("a_b", 10)));
        assert_eq!(gallery_suffix("rolex-sub"), None);
        assert_eq!(gallery_suffix("_2"), None);
    }

    #[test]
    fn test_lookup_order() {
        let index = index();
        assert_eq!(index.lookup("GA-2100"), Some((3, MatchedBy::Sku)));
        assert_eq!(index.lookup("T035_617_11_051_00"), Some((2, MatchedBy::Sku)));
        assert_eq!(index.lookup("rolex-sub"), Some((1, MatchedBy::Slug)));
        assert_eq!(index.lookup("Rolex Sub"), Some((1, MatchedBy::Slug)));
        assert_eq!(index.lookup("unknown"), None);
    }

    #[test]
    fn test_gallery_images_follow_their_primary() {
        let report = match_images_to_products(
            &["rolex-sub_2.jpg", "rolex-sub.jpg", "omega_1.jpg", "notes.txt"],
            &index(),
        );

        assert_eq!(report.matched.len(), 2);
        let gallery = report
            .matched
            .iter()
            .find(|m| m.filename == "rolex-sub_2.jpg")
            .unwrap();
        assert!(gallery.is_gallery);
        assert_eq!(gallery.product_id, 1);
        assert_eq!(gallery.parent_filename.as_deref(), Some("rolex-sub.jpg"));
        assert_eq!(gallery.gallery_index, Some(2));

        assert_eq!(report.unmatched, ["omega_1.jpg", "notes.txt"]);
    }

    #[test]
    fn test_unmatched_keeps_upload_order() {
        let report = match_images_to_products(
            &["omega_1.jpg", "notes.txt", "unknown.png", "breitling_3.jpg"],
            &index(),
        );

        assert!(report.matched.is_empty());
        assert_eq!(
            report.unmatched,
            ["omega_1.jpg", "notes.txt", "unknown.png", "breitling_3.jpg"]
        );
    }

    #[test]
    fn test_gallery_attaches_to_primary_matched_by_sku() {
        let index = ProductIndex::new(&[key(7, Some("rolex-sub"), "rolex-submariner")]);

        let report =
            match_images_to_products(&["rolex-sub", "rolex-sub_2.jpg", "rolex-sub.jpg"], &index);

        assert_eq!(report.unmatched, ["rolex-sub"]);
        assert_eq!(report.matched.len(), 2);
        let primary = &report.matched[0];
        assert_eq!(primary.filename, "rolex-sub.jpg");
        assert_eq!(primary.matched_by, MatchedBy::Sku);
        let gallery = &report.matched[1];
        assert_eq!(gallery.filename, "rolex-sub_2.jpg");
        assert!(gallery.is_gallery);
        assert_eq!(gallery.product_id, 7);
        assert_eq!(gallery.parent_filename.as_deref(), Some("rolex-sub.jpg"));
    }

    #[test]
    fn test_suffixed_stem_matching_a_product_is_primary() {
        let report = match_images_to_products(&["T035_617_11_051_00.jpg"], &index());

        assert_eq!(report.matched.len(), 1);
        assert!(!report.matched[0].is_gallery);
        assert_eq!(report.matched[0].product_id, 2);
        assert_eq!(report.matched[0].matched_by, MatchedBy::Sku);
    }

    #[tokio::test]
    async fn test_update_orders_gallery_numerically() {
        let pool = connect_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let product_id = ProductRepository::insert(
            &mut conn,
            &ProductFields {
                sku: None,
                slug: "rolex-sub".to_string(),
                name: "Rolex Sub".to_string(),
                brand_id: None,
                category_id: None,
                price: 100,
                old_price: None,
                description: None,
                specs: None,
                stock: 0,
                is_active: true,
                is_featured: false,
                meta_title: None,
                meta_description: None,
            },
        )
        .await
        .unwrap();

        let index = ProductIndex::load(&mut conn).await.unwrap();
        let files = ["rolex-sub_10.jpg", "rolex-sub_2.jpg", "rolex-sub.jpg", "rolex-sub_3.jpg"];
        let report = match_images_to_products(&files, &index);

        let url = |name: &str| format!("/media/images/products/{}.webp", name);
        let image_map: HashMap<String, String> = files
            .iter()
            .filter(|f| **f != "rolex-sub_3.jpg")
            .map(|f| (f.to_string(), url(file_stem(f))))
            .collect();

        let updated = update_product_images(&mut conn, &report, &image_map, &HashMap::new())
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let images = ProductRepository::list_images(&mut conn, product_id)
            .await
            .unwrap();
        let urls: Vec<&str> = images.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            [url("rolex-sub"), url("rolex-sub_2"), url("rolex-sub_10")]
        );
        assert!(images[0].is_main);
        assert!(!images[1].is_main);
    }
}
