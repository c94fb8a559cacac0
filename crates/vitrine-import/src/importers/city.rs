use async_trait::async_trait;
use sqlx::SqliteConnection;
use vitrine_core::models::ImportError;
use vitrine_core::EntityKind;
use vitrine_db::{merge_optional, CityFields, CityRepository};

use super::{EntityImporter, RowFailure, RowReader, Upserted};
use crate::csv::Row;

pub const CITY_COLUMNS: &[&str] = &[
    "name",
    "slug",
    "name_prepositional",
    "region",
    "population",
    "delivery_days",
    "delivery_price",
    "sort_order",
    "is_active",
    "meta_title",
    "meta_description",
];

#[derive(Debug, Clone, PartialEq)]
pub struct CityRecord {
    pub name: String,
    pub slug: String,
    pub name_prepositional: Option<Option<String>>,
    pub region: Option<Option<String>>,
    pub population: Option<Option<i64>>,
    pub delivery_days: Option<Option<i64>>,
    /// Minor units.
    pub delivery_price: Option<Option<i64>>,
    pub sort_order: Option<i64>,
    pub is_active: Option<bool>,
    pub meta_title: Option<Option<String>>,
    pub meta_description: Option<Option<String>>,
}

impl CityRecord {
    fn into_fields(self, current: Option<CityFields>) -> CityFields {
        let mut fields = current.unwrap_or_else(|| CityFields {
            name: String::new(),
            slug: self.slug.clone(),
            name_prepositional: None,
            region: None,
            population: None,
            delivery_days: None,
            delivery_price: None,
            sort_order: 0,
            is_active: true,
            meta_title: None,
            meta_description: None,
        });

        fields.name = self.name;
        fields.name_prepositional =
            merge_optional(self.name_prepositional, fields.name_prepositional.take());
        fields.region = merge_optional(self.region, fields.region.take());
        fields.population = merge_optional(self.population, fields.population);
        fields.delivery_days = merge_optional(self.delivery_days, fields.delivery_days);
        fields.delivery_price = merge_optional(self.delivery_price, fields.delivery_price);
        if let Some(sort_order) = self.sort_order {
            fields.sort_order = sort_order;
        }
        if let Some(is_active) = self.is_active {
            fields.is_active = is_active;
        }
        fields.meta_title = merge_optional(self.meta_title, fields.meta_title.take());
        fields.meta_description =
            merge_optional(self.meta_description, fields.meta_description.take());
        fields
    }
}

/// Upserts delivery cities by slug.
#[derive(Debug, Default)]
pub struct CityImporter;

#[async_trait]
impl EntityImporter for CityImporter {
    type Record = CityRecord;

    fn entity(&self) -> EntityKind {
        EntityKind::Cities
    }

    fn key_field(&self) -> &'static str {
        "slug"
    }

    fn parse_row(&self, row: &Row) -> Result<CityRecord, ImportError> {
        let reader = RowReader::new(row);
        let name = reader.required("name")?;
        let slug = reader.slug_or("slug", &name)?;

        Ok(CityRecord {
            slug,
            name,
            name_prepositional: reader.text("name_prepositional"),
            region: reader.text("region"),
            population: reader.nullable_int("population")?,
            delivery_days: reader.nullable_int("delivery_days")?,
            delivery_price: reader.nullable_money("delivery_price")?,
            sort_order: reader.int("sort_order")?,
            is_active: reader.bool("is_active")?,
            meta_title: reader.text("meta_title"),
            meta_description: reader.text("meta_description"),
        })
    }

    async fn upsert(
        &mut self,
        conn: &mut SqliteConnection,
        record: CityRecord,
        _line: usize,
    ) -> Result<Upserted, RowFailure> {
        match CityRepository::find_by_slug(conn, &record.slug).await? {
            Some(existing) => {
                let fields = record.into_fields(Some(CityFields::from(&existing)));
                CityRepository::update(conn, existing.id, &fields).await?;
                Ok(Upserted::Updated)
            }
            None => {
                let fields = record.into_fields(None);
                CityRepository::insert(conn, &fields).await?;
                Ok(Upserted::Added)
            }
        }
    }
}
