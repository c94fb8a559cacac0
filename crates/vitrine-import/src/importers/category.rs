use async_trait::async_trait;
use sqlx::SqliteConnection;
use vitrine_core::models::ImportError;
use vitrine_core::slug::slugify;
use vitrine_core::EntityKind;
use vitrine_db::{merge_optional, CategoryFields, CategoryRepository};

use super::{EntityImporter, RowFailure, RowReader, Upserted};
use crate::csv::Row;

pub const CATEGORY_COLUMNS: &[&str] = &[
    "name",
    "slug",
    "parent_slug",
    "description",
    "image",
    "sort_order",
    "is_active",
    "meta_title",
    "meta_description",
];

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRecord {
    pub name: String,
    pub slug: String,
    /// `Some(None)` detaches the category from its parent.
    pub parent_slug: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub image: Option<Option<String>>,
    pub sort_order: Option<i64>,
    pub is_active: Option<bool>,
    pub meta_title: Option<Option<String>>,
    pub meta_description: Option<Option<String>>,
}

impl CategoryRecord {
    fn apply(self, fields: &mut CategoryFields, parent_id: Option<Option<i64>>) {
        fields.name = self.name;
        fields.parent_id = merge_optional(parent_id, fields.parent_id);
        fields.description = merge_optional(self.description, fields.description.take());
        fields.image = merge_optional(self.image, fields.image.take());
        if let Some(sort_order) = self.sort_order {
            fields.sort_order = sort_order;
        }
        if let Some(is_active) = self.is_active {
            fields.is_active = is_active;
        }
        fields.meta_title = merge_optional(self.meta_title, fields.meta_title.take());
        fields.meta_description =
            merge_optional(self.meta_description, fields.meta_description.take());
    }
}

/// Upserts categories by slug. Parents must already exist (earlier in the
/// same file counts); they are never created implicitly.
#[derive(Debug, Default)]
pub struct CategoryImporter;

#[async_trait]
impl EntityImporter for CategoryImporter {
    type Record = CategoryRecord;

    fn entity(&self) -> EntityKind {
        EntityKind::Categories
    }

    fn key_field(&self) -> &'static str {
        "slug"
    }

    fn parse_row(&self, row: &Row) -> Result<CategoryRecord, ImportError> {
        let reader = RowReader::new(row);
        let name = reader.required("name")?;
        let slug = reader.slug_or("slug", &name)?;

        let parent_slug = reader
            .text("parent_slug")
            .map(|parent| parent.map(|p| slugify(&p)).filter(|p| !p.is_empty()));
        if matches!(&parent_slug, Some(Some(parent)) if *parent == slug) {
            return Err(reader.error("parent_slug", "Category cannot be its own parent"));
        }

        Ok(CategoryRecord {
            slug,
            name,
            parent_slug,
            description: reader.text("description"),
            image: reader.text("image"),
            sort_order: reader.int("sort_order")?,
            is_active: reader.bool("is_active")?,
            meta_title: reader.text("meta_title"),
            meta_description: reader.text("meta_description"),
        })
    }

    async fn upsert(
        &mut self,
        conn: &mut SqliteConnection,
        mut record: CategoryRecord,
        line: usize,
    ) -> Result<Upserted, RowFailure> {
        let parent_id = match record.parent_slug.take() {
            None => None,
            Some(None) => Some(None),
            Some(Some(parent)) => match CategoryRepository::id_by_slug(conn, &parent).await? {
                Some(id) => Some(Some(id)),
                None => {
                    return Err(RowFailure::Invalid(ImportError::new(
                        line,
                        "parent_slug",
                        format!("Parent category '{}' not found", parent),
                    )))
                }
            },
        };

        match CategoryRepository::find_by_slug(conn, &record.slug).await? {
            Some(existing) => {
                let mut fields = CategoryFields::from(&existing);
                record.apply(&mut fields, parent_id);
                CategoryRepository::update(conn, existing.id, &fields).await?;
                Ok(Upserted::Updated)
            }
            None => {
                let mut fields = CategoryFields::named(record.name.clone(), record.slug.clone());
                record.apply(&mut fields, parent_id);
                CategoryRepository::insert(conn, &fields).await?;
                Ok(Upserted::Added)
            }
        }
    }
}
