use async_trait::async_trait;
use sqlx::SqliteConnection;
use vitrine_core::models::ImportError;
use vitrine_core::EntityKind;
use vitrine_db::{merge_optional, BrandFields, BrandRepository};

use super::{EntityImporter, RowFailure, RowReader, Upserted};
use crate::csv::Row;

pub const BRAND_COLUMNS: &[&str] = &[
    "name",
    "slug",
    "description",
    "country",
    "logo",
    "website",
    "sort_order",
    "is_active",
    "meta_title",
    "meta_description",
];

#[derive(Debug, Clone, PartialEq)]
pub struct BrandRecord {
    pub name: String,
    pub slug: String,
    pub description: Option<Option<String>>,
    pub country: Option<Option<String>>,
    pub logo: Option<Option<String>>,
    pub website: Option<Option<String>>,
    pub sort_order: Option<i64>,
    pub is_active: Option<bool>,
    pub meta_title: Option<Option<String>>,
    pub meta_description: Option<Option<String>>,
}

impl BrandRecord {
    fn apply(self, fields: &mut BrandFields) {
        fields.name = self.name;
        fields.description = merge_optional(self.description, fields.description.take());
        fields.country = merge_optional(self.country, fields.country.take());
        fields.logo = merge_optional(self.logo, fields.logo.take());
        fields.website = merge_optional(self.website, fields.website.take());
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

/// Upserts brands by slug.
#[derive(Debug, Default)]
pub struct BrandImporter;

#[async_trait]
impl EntityImporter for BrandImporter {
    type Record = BrandRecord;

    fn entity(&self) -> EntityKind {
        EntityKind::Brands
    }

    fn key_field(&self) -> &'static str {
        "slug"
    }

    fn parse_row(&self, row: &Row) -> Result<BrandRecord, ImportError> {
        let reader = RowReader::new(row);
        let name = reader.required("name")?;
        let slug = reader.slug_or("slug", &name)?;

        Ok(BrandRecord {
            slug,
            name,
            description: reader.text("description"),
            country: reader.text("country"),
            logo: reader.text("logo"),
            website: reader.text("website"),
            sort_order: reader.int("sort_order")?,
            is_active: reader.bool("is_active")?,
            meta_title: reader.text("meta_title"),
            meta_description: reader.text("meta_description"),
        })
    }

    async fn upsert(
        &mut self,
        conn: &mut SqliteConnection,
        record: BrandRecord,
        _line: usize,
    ) -> Result<Upserted, RowFailure> {
        match BrandRepository::find_by_slug(conn, &record.slug).await? {
            Some(existing) => {
                let mut fields = BrandFields::from(&existing);
                record.apply(&mut fields);
                BrandRepository::update(conn, existing.id, &fields).await?;
                Ok(Upserted::Updated)
            }
            None => {
                let mut fields = BrandFields::named(record.name.clone(), record.slug.clone());
                record.apply(&mut fields);
                BrandRepository::insert(conn, &fields).await?;
                Ok(Upserted::Added)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importers::run_import;
    use crate::importers::test_support::{pool, rows};

    #[tokio::test]
    async fn test_second_import_updates_instead_of_inserting() {
        let pool = pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let csv = "name,country,is_active\nOmega,Switzerland,1\nSeiko,Japan,да\n";

        let first = run_import(&mut BrandImporter, &mut conn, &rows(csv))
            .await
            .unwrap();
        assert_eq!((first.added, first.updated), (2, 0));
        let before = BrandRepository::list(&mut conn).await.unwrap();

        let second = run_import(&mut BrandImporter, &mut conn, &rows(csv))
            .await
            .unwrap();
        assert_eq!((second.added, second.updated), (0, 2));
        assert!(second.errors.is_empty());

        let after = BrandRepository::list(&mut conn).await.unwrap();
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(&after) {
            assert_eq!(BrandFields::from(a), BrandFields::from(b));
            assert_eq!(a.id, b.id);
        }
    }

    #[tokio::test]
    async fn test_absent_columns_are_kept_and_empty_ones_cleared() {
        let pool = pool().await;
        let mut conn = pool.acquire().await.unwrap();

        run_import(
            &mut BrandImporter,
            &mut conn,
            &rows("name,country,website\nOmega,Switzerland,https://omega.example\n"),
        )
        .await
        .unwrap();
        run_import(
            &mut BrandImporter,
            &mut conn,
            &rows("name,website\nOmega,\n"),
        )
        .await
        .unwrap();

        let brand = BrandRepository::find_by_slug(&mut conn, "omega")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(brand.country.as_deref(), Some("Switzerland"));
        assert_eq!(brand.website, None);
    }

    #[tokio::test]
    async fn test_missing_name_is_a_row_error() {
        let pool = pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let result = run_import(
            &mut BrandImporter,
            &mut conn,
            &rows("name,country\n,France\nCasio,Japan\n"),
        )
        .await
        .unwrap();

        assert_eq!(result.added, 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].row, 2);
        assert_eq!(result.errors[0].field, "name");
    }
}
