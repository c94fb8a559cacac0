use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use vitrine_core::models::ImportError;
use vitrine_core::slug::slugify;
use vitrine_core::EntityKind;
use vitrine_db::{merge_optional, CityArticleFields, CityArticleRepository, CityRepository};

use super::{EntityImporter, RowFailure, RowReader, Upserted};
use crate::csv::Row;

pub const CITY_ARTICLE_COLUMNS: &[&str] = &[
    "city_slug",
    "title",
    "slug",
    "excerpt",
    "content",
    "image",
    "is_published",
    "meta_title",
    "meta_description",
];

#[derive(Debug, Clone, PartialEq)]
pub struct CityArticleRecord {
    pub city_slug: String,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<Option<String>>,
    pub content: Option<Option<String>>,
    pub image: Option<Option<String>>,
    pub is_published: Option<bool>,
    pub meta_title: Option<Option<String>>,
    pub meta_description: Option<Option<String>>,
}

/// Upserts SEO articles keyed by `(city, slug)`. Every written row is
/// stamped with the upload filename and the batch time.
#[derive(Debug)]
pub struct CityArticleImporter {
    source_file: Option<String>,
    imported_at: DateTime<Utc>,
}

impl CityArticleImporter {
    pub fn new(source_file: Option<String>) -> Self {
        Self {
            source_file,
            imported_at: Utc::now(),
        }
    }

    fn fields(
        &self,
        record: CityArticleRecord,
        city_id: i64,
        current: Option<CityArticleFields>,
    ) -> CityArticleFields {
        let mut fields = current.unwrap_or_else(|| CityArticleFields {
            city_id,
            slug: record.slug.clone(),
            title: String::new(),
            excerpt: None,
            content: None,
            image: None,
            is_published: true,
            meta_title: None,
            meta_description: None,
            source_file: None,
            imported_at: None,
        });

        fields.title = record.title;
        fields.excerpt = merge_optional(record.excerpt, fields.excerpt.take());
        fields.content = merge_optional(record.content, fields.content.take());
        fields.image = merge_optional(record.image, fields.image.take());
        if let Some(is_published) = record.is_published {
            fields.is_published = is_published;
        }
        fields.meta_title = merge_optional(record.meta_title, fields.meta_title.take());
        fields.meta_description =
            merge_optional(record.meta_description, fields.meta_description.take());
        fields.source_file = self.source_file.clone();
        fields.imported_at = Some(self.imported_at);
        fields
    }
}

#[async_trait]
impl EntityImporter for CityArticleImporter {
    type Record = CityArticleRecord;

    fn entity(&self) -> EntityKind {
        EntityKind::CityArticles
    }

    fn key_field(&self) -> &'static str {
        "slug"
    }

    fn parse_row(&self, row: &Row) -> Result<CityArticleRecord, ImportError> {
        let reader = RowReader::new(row);
        let city_slug = slugify(&reader.required("city_slug")?);
        let title = reader.required("title")?;
        let slug = reader.slug_or("slug", &title)?;

        Ok(CityArticleRecord {
            city_slug,
            title,
            slug,
            excerpt: reader.text("excerpt"),
            content: reader.text("content"),
            image: reader.text("image"),
            is_published: reader.bool("is_published")?,
            meta_title: reader.text("meta_title"),
            meta_description: reader.text("meta_description"),
        })
    }

    async fn upsert(
        &mut self,
        conn: &mut SqliteConnection,
        record: CityArticleRecord,
        line: usize,
    ) -> Result<Upserted, RowFailure> {
        let Some(city_id) = CityRepository::id_by_slug(conn, &record.city_slug).await? else {
            return Err(RowFailure::Invalid(ImportError::new(
                line,
                "city_slug",
                format!("City '{}' not found", record.city_slug),
            )));
        };

        match CityArticleRepository::find(conn, city_id, &record.slug).await? {
            Some(existing) => {
                let current = CityArticleFields::from(&existing);
                let fields = self.fields(record, city_id, Some(current));
                CityArticleRepository::update(conn, existing.id, &fields).await?;
                Ok(Upserted::Updated)
            }
            None => {
                let fields = self.fields(record, city_id, None);
                CityArticleRepository::insert(conn, &fields).await?;
                Ok(Upserted::Added)
            }
        }
    }
}
