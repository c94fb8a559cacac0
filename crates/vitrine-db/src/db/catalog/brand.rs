use chrono::Utc;
use sqlx::SqliteConnection;
use vitrine_core::{models::Brand, AppError};

#[derive(Debug, Clone, PartialEq)]
pub struct BrandFields {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub country: Option<String>,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub sort_order: i64,
    pub is_active: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

impl BrandFields {
    /// Fields for a brand known only by name and slug.
    pub fn named(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            description: None,
            country: None,
            logo: None,
            website: None,
            sort_order: 0,
            is_active: true,
            meta_title: None,
            meta_description: None,
        }
    }
}

impl From<&Brand> for BrandFields {
    fn from(brand: &Brand) -> Self {
        Self {
            name: brand.name.clone(),
            slug: brand.slug.clone(),
            description: brand.description.clone(),
            country: brand.country.clone(),
            logo: brand.logo.clone(),
            website: brand.website.clone(),
            sort_order: brand.sort_order,
            is_active: brand.is_active,
            meta_title: brand.meta_title.clone(),
            meta_description: brand.meta_description.clone(),
        }
    }
}

/// Repository for the `brands` table
pub struct BrandRepository;

impl BrandRepository {
    #[tracing::instrument(skip(conn), fields(db.table = "brands", db.operation = "select"))]
    pub async fn find_by_slug(
        conn: &mut SqliteConnection,
        slug: &str,
    ) -> Result<Option<Brand>, AppError> {
        let brand = sqlx::query_as::<_, Brand>(
            r#"
            SELECT id, name, slug, description, country, logo, website, sort_order, is_active,
                   meta_title, meta_description, created_at, updated_at
            FROM brands WHERE slug = ?
            "#,
        )
        .bind(slug)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(brand)
    }

    pub async fn id_by_slug(conn: &mut SqliteConnection, slug: &str) -> Result<Option<i64>, AppError> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM brands WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(id)
    }

    #[tracing::instrument(skip(conn, fields), fields(db.table = "brands", db.operation = "insert", slug = %fields.slug))]
    pub async fn insert(conn: &mut SqliteConnection, fields: &BrandFields) -> Result<i64, AppError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO brands (name, slug, description, country, logo, website, sort_order,
                                is_active, meta_title, meta_description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.slug)
        .bind(&fields.description)
        .bind(&fields.country)
        .bind(&fields.logo)
        .bind(&fields.website)
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

    #[tracing::instrument(skip(conn, fields), fields(db.table = "brands", db.operation = "update", db.record_id = id))]
    pub async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        fields: &BrandFields,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE brands
            SET name = ?, slug = ?, description = ?, country = ?, logo = ?, website = ?,
                sort_order = ?, is_active = ?, meta_title = ?, meta_description = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.slug)
        .bind(&fields.description)
        .bind(&fields.country)
        .bind(&fields.logo)
        .bind(&fields.website)
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

    pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<Brand>, AppError> {
        let brands = sqlx::query_as::<_, Brand>(
            r#"
            SELECT id, name, slug, description, country, logo, website, sort_order, is_active,
                   meta_title, meta_description, created_at, updated_at
            FROM brands ORDER BY sort_order ASC, name ASC
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(brands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{connect_in_memory, is_unique_violation};

    #[tokio::test]
    async fn test_insert_find_update() {
        let pool = connect_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let id = BrandRepository::insert(&mut conn, &BrandFields::named("Omega", "omega"))
            .await
            .unwrap();

        let mut fields = BrandFields::from(
            &BrandRepository::find_by_slug(&mut conn, "omega")
                .await
                .unwrap()
                .unwrap(),
        );
        fields.country = Some("Switzerland".to_string());
        BrandRepository::update(&mut conn, id, &fields).await.unwrap();

        let brand = BrandRepository::find_by_slug(&mut conn, "omega")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(brand.id, id);
        assert_eq!(brand.country.as_deref(), Some("Switzerland"));
        assert!(brand.is_active);
        assert_eq!(
            BrandRepository::id_by_slug(&mut conn, "omega").await.unwrap(),
            Some(id)
        );
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_unique_violation() {
        let pool = connect_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        BrandRepository::insert(&mut conn, &BrandFields::named("Omega", "omega"))
            .await
            .unwrap();
        let err = BrandRepository::insert(&mut conn, &BrandFields::named("Omega 2", "omega"))
            .await
            .unwrap_err();

        assert!(is_unique_violation(&err));
    }
}
