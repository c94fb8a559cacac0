use chrono::Utc;
use sqlx::SqliteConnection;
use vitrine_core::{models::City, AppError};

#[derive(Debug, Clone, PartialEq)]
pub struct CityFields {
    pub name: String,
    pub slug: String,
    pub name_prepositional: Option<String>,
    pub region: Option<String>,
    pub population: Option<i64>,
    pub delivery_days: Option<i64>,
    pub delivery_price: Option<i64>,
    pub sort_order: i64,
    pub is_active: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

impl From<&City> for CityFields {
    fn from(city: &City) -> Self {
        Self {
            name: city.name.clone(),
            slug: city.slug.clone(),
            name_prepositional: city.name_prepositional.clone(),
            region: city.region.clone(),
            population: city.population,
            delivery_days: city.delivery_days,
            delivery_price: city.delivery_price,
            sort_order: city.sort_order,
            is_active: city.is_active,
            meta_title: city.meta_title.clone(),
            meta_description: city.meta_description.clone(),
        }
    }
}

/// Repository for the `cities` table
pub struct CityRepository;

impl CityRepository {
    #[tracing::instrument(skip(conn), fields(db.table = "cities", db.operation = "select"))]
    pub async fn find_by_slug(
        conn: &mut SqliteConnection,
        slug: &str,
    ) -> Result<Option<City>, AppError> {
        let city = sqlx::query_as::<_, City>(
            r#"
            SELECT id, name, slug, name_prepositional, region, population, delivery_days,
                   delivery_price, sort_order, is_active, meta_title, meta_description,
                   created_at, updated_at
            FROM cities WHERE slug = ?
            "#,
        )
        .bind(slug)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(city)
    }

    pub async fn id_by_slug(conn: &mut SqliteConnection, slug: &str) -> Result<Option<i64>, AppError> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM cities WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(id)
    }

    #[tracing::instrument(skip(conn, fields), fields(db.table = "cities", db.operation = "insert", slug = %fields.slug))]
    pub async fn insert(conn: &mut SqliteConnection, fields: &CityFields) -> Result<i64, AppError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO cities (name, slug, name_prepositional, region, population, delivery_days,
                                delivery_price, sort_order, is_active, meta_title,
                                meta_description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.slug)
        .bind(&fields.name_prepositional)
        .bind(&fields.region)
        .bind(fields.population)
        .bind(fields.delivery_days)
        .bind(fields.delivery_price)
        .bind(fields.sort_order)
        .bind(fields.is_active)
        .bind(&fields.meta_title)
        .bind(&fields.meta_description)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    #[tracing::instrument(skip(conn, fields), fields(db.table = "cities", db.operation = "update", db.record_id = id))]
    pub async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        fields: &CityFields,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE cities
            SET name = ?, slug = ?, name_prepositional = ?, region = ?, population = ?,
                delivery_days = ?, delivery_price = ?, sort_order = ?, is_active = ?,
                meta_title = ?, meta_description = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.slug)
        .bind(&fields.name_prepositional)
        .bind(&fields.region)
        .bind(fields.population)
        .bind(fields.delivery_days)
        .bind(fields.delivery_price)
        .bind(fields.sort_order)
        .bind(fields.is_active)
        .bind(&fields.meta_title)
        .bind(&fields.meta_description)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<City>, AppError> {
        let cities = sqlx::query_as::<_, City>(
            r#"
            SELECT id, name, slug, name_prepositional, region, population, delivery_days,
                   delivery_price, sort_order, is_active, meta_title, meta_description,
                   created_at, updated_at
            FROM cities ORDER BY sort_order ASC, name ASC
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(cities)
    }
}
