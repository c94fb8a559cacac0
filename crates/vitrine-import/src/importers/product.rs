use async_trait::async_trait;
use sqlx::SqliteConnection;
use vitrine_core::models::{ImportError, Product};
use vitrine_core::slug::slugify;
use vitrine_core::{AppError, EntityKind};
use vitrine_db::{
    merge_optional, BrandRepository, CategoryRepository, NewProductImage, ProductFields,
    ProductRepository,
};
use vitrine_processing::thumb_url_for;

use super::{EntityImporter, RowFailure, RowReader, Upserted};
use crate::csv::Row;

pub const PRODUCT_COLUMNS: &[&str] = &[
    "sku",
    "name",
    "slug",
    "brand_slug",
    "category_slug",
    "price",
    "old_price",
    "description",
    "specs",
    "stock",
    "is_active",
    "is_featured",
    "main_image",
    "gallery_images",
    "meta_title",
    "meta_description",
];

/// A validated product row. `name` and `price` may be omitted only when the
/// row updates an existing product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub sku: Option<Option<String>>,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub brand_slug: Option<Option<String>>,
    pub category_slug: Option<Option<String>>,
    /// Minor units.
    pub price: Option<i64>,
    pub old_price: Option<Option<i64>>,
    pub description: Option<Option<String>>,
    /// Validated JSON text.
    pub specs: Option<Option<String>>,
    pub stock: Option<i64>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub main_image: Option<String>,
    pub gallery_images: Vec<String>,
    pub meta_title: Option<Option<String>>,
    pub meta_description: Option<Option<String>>,
}

impl ProductRecord {
    fn sku(&self) -> Option<&str> {
        self.sku.as_ref().and_then(|sku| sku.as_deref())
    }

    /// Explicit slug, else one derived from the name.
    fn natural_slug(&self) -> Option<String> {
        self.slug
            .clone()
            .or_else(|| self.name.as_deref().map(slugify))
            .filter(|slug| !slug.is_empty())
    }

    /// Only rows that name at least one image replace the image set.
    fn touches_images(&self) -> bool {
        self.main_image.is_some() || !self.gallery_images.is_empty()
    }

    fn images(&self) -> Vec<NewProductImage> {
        self.main_image
            .iter()
            .chain(self.gallery_images.iter())
            .enumerate()
            .map(|(position, url)| NewProductImage {
                url: url.clone(),
                thumb_url: thumb_url_for(url),
                alt: self.name.clone(),
                is_main: position == 0,
            })
            .collect()
    }
}

struct References {
    brand_id: Option<Option<i64>>,
    category_id: Option<Option<i64>>,
}

/// Upserts products keyed by SKU, falling back to slug.
///
/// Image rows are replaced only for rows that carry `main_image` or
/// `gallery_images`; the full-text index is rebuilt once per batch.
#[derive(Debug, Default)]
pub struct ProductImporter;

impl ProductImporter {
    async fn resolve_references(
        conn: &mut SqliteConnection,
        record: &ProductRecord,
        line: usize,
    ) -> Result<References, RowFailure> {
        let brand_id = match &record.brand_slug {
            None => None,
            Some(None) => Some(None),
            Some(Some(slug)) => match BrandRepository::id_by_slug(conn, slug).await? {
                Some(id) => Some(Some(id)),
                None => {
                    return Err(RowFailure::Invalid(ImportError::new(
                        line,
                        "brand_slug",
                        format!("Brand '{}' not found", slug),
                    )))
                }
            },
        };

        let category_id = match &record.category_slug {
            None => None,
            Some(None) => Some(None),
            Some(Some(slug)) => match CategoryRepository::id_by_slug(conn, slug).await? {
                Some(id) => Some(Some(id)),
                None => {
                    return Err(RowFailure::Invalid(ImportError::new(
                        line,
                        "category_slug",
                        format!("Category '{}' not found", slug),
                    )))
                }
            },
        };

        Ok(References {
            brand_id,
            category_id,
        })
    }

    /// Existing product by SKU; a product stored without a SKU is also found
    /// by slug so a later file can assign one.
    async fn find_existing(
        conn: &mut SqliteConnection,
        record: &ProductRecord,
    ) -> Result<Option<Product>, AppError> {
        if let Some(sku) = record.sku() {
            if let Some(product) = ProductRepository::find_by_sku(conn, sku).await? {
                return Ok(Some(product));
            }
        }

        let Some(slug) = record.natural_slug() else {
            return Ok(None);
        };
        let found = ProductRepository::find_by_slug(conn, &slug).await?;
        Ok(match record.sku() {
            Some(_) => found.filter(|product| product.sku.is_none()),
            None => found,
        })
    }

    fn apply(record: &ProductRecord, refs: References, fields: &mut ProductFields) {
        if let Some(sku) = &record.sku {
            fields.sku = sku.clone();
        }
        if let Some(slug) = &record.slug {
            fields.slug = slug.clone();
        }
        if let Some(name) = &record.name {
            fields.name = name.clone();
        }
        fields.brand_id = merge_optional(refs.brand_id, fields.brand_id);
        fields.category_id = merge_optional(refs.category_id, fields.category_id);
        if let Some(price) = record.price {
            fields.price = price;
        }
        fields.old_price = merge_optional(record.old_price, fields.old_price);
        fields.description = merge_optional(record.description.clone(), fields.description.take());
        fields.specs = merge_optional(record.specs.clone(), fields.specs.take());
        if let Some(stock) = record.stock {
            fields.stock = stock;
        }
        if let Some(is_active) = record.is_active {
            fields.is_active = is_active;
        }
        if let Some(is_featured) = record.is_featured {
            fields.is_featured = is_featured;
        }
        fields.meta_title = merge_optional(record.meta_title.clone(), fields.meta_title.take());
        fields.meta_description =
            merge_optional(record.meta_description.clone(), fields.meta_description.take());
    }
}

#[async_trait]
impl EntityImporter for ProductImporter {
    type Record = ProductRecord;

    fn entity(&self) -> EntityKind {
        EntityKind::Products
    }

    fn key_field(&self) -> &'static str {
        "sku"
    }

    fn parse_row(&self, row: &Row) -> Result<ProductRecord, ImportError> {
        let reader = RowReader::new(row);

        let sku = reader.text("sku");
        let name = reader.value("name").map(str::to_string);
        let slug = match reader.value("slug") {
            Some(raw) => Some(reader.slug_or("slug", raw)?),
            None => None,
        };

        let has_sku = matches!(&sku, Some(Some(_)));
        if !has_sku && slug.is_none() && name.is_none() {
            return Err(reader.error("name", "name is required"));
        }

        let slug_column = |column: &str| {
            reader
                .text(column)
                .map(|value| value.map(|v| slugify(&v)).filter(|v| !v.is_empty()))
        };

        Ok(ProductRecord {
            sku,
            slug,
            name,
            brand_slug: slug_column("brand_slug"),
            category_slug: slug_column("category_slug"),
            price: reader.money("price")?,
            old_price: reader.nullable_money("old_price")?,
            description: reader.text("description"),
            specs: reader.json("specs")?,
            stock: reader.non_negative_int("stock")?,
            is_active: reader.bool("is_active")?,
            is_featured: reader.bool("is_featured")?,
            main_image: reader.value("main_image").map(str::to_string),
            gallery_images: reader.list("gallery_images"),
            meta_title: reader.text("meta_title"),
            meta_description: reader.text("meta_description"),
        })
    }

    async fn upsert(
        &mut self,
        conn: &mut SqliteConnection,
        record: ProductRecord,
        line: usize,
    ) -> Result<Upserted, RowFailure> {
        let refs = Self::resolve_references(conn, &record, line).await?;

        let (product_id, outcome) = match Self::find_existing(conn, &record).await? {
            Some(existing) => {
                let mut fields = ProductFields::from(&existing);
                Self::apply(&record, refs, &mut fields);
                ProductRepository::update(conn, existing.id, &fields).await?;
                (existing.id, Upserted::Updated)
            }
            None => {
                let Some(name) = record.name.clone() else {
                    return Err(ImportError::new(line, "name", "name is required").into());
                };
                let Some(price) = record.price else {
                    return Err(ImportError::new(line, "price", "price is required").into());
                };
                let Some(slug) = record.natural_slug() else {
                    return Err(ImportError::new(
                        line,
                        "slug",
                        format!("Cannot derive a slug from '{}'", name),
                    )
                    .into());
                };

                let mut fields = ProductFields {
                    sku: None,
                    slug,
                    name,
                    brand_id: None,
                    category_id: None,
                    price,
                    old_price: None,
                    description: None,
                    specs: None,
                    stock: 0,
                    is_active: true,
                    is_featured: false,
                    meta_title: None,
                    meta_description: None,
                };
                Self::apply(&record, refs, &mut fields);
                let id = ProductRepository::insert(conn, &fields).await?;
                (id, Upserted::Added)
            }
        };

        if record.touches_images() {
            ProductRepository::replace_images(conn, product_id, &record.images()).await?;
        }

        Ok(outcome)
    }

    async fn finish(&mut self, conn: &mut SqliteConnection) -> Result<(), AppError> {
        ProductRepository::rebuild_search_index(conn).await
    }
}
