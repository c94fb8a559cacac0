use chrono::Utc;
use sqlx::{FromRow, SqliteConnection};
use vitrine_core::{
    models::{Product, ProductImage},
    AppError,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub sku: Option<String>,
    pub slug: String,
    pub name: String,
    pub brand_id: Option<i64>,
    pub category_id: Option<i64>,
    pub price: i64,
    pub old_price: Option<i64>,
    pub description: Option<String>,
    pub specs: Option<String>,
    pub stock: i64,
    pub is_active: bool,
    pub is_featured: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

impl From<&Product> for ProductFields {
    fn from(product: &Product) -> Self {
        Self {
            sku: product.sku.clone(),
            slug: product.slug.clone(),
            name: product.name.clone(),
            brand_id: product.brand_id,
            category_id: product.category_id,
            price: product.price,
            old_price: product.old_price,
            description: product.description.clone(),
            specs: product.specs.clone(),
            stock: product.stock,
            is_active: product.is_active,
            is_featured: product.is_featured,
            meta_title: product.meta_title.clone(),
            meta_description: product.meta_description.clone(),
        }
    }
}

/// One image row to write; position in the slice becomes `sort_order`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProductImage {
    pub url: String,
    pub thumb_url: Option<String>,
    pub alt: Option<String>,
    pub is_main: bool,
}

/// Natural keys of a product, loaded in bulk for image matching.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ProductKey {
    pub id: i64,
    pub sku: Option<String>,
    pub slug: String,
    pub name: String,
}

/// Product with brand and category resolved to slugs.
#[derive(Debug, Clone, FromRow)]
pub struct ProductExportRow {
    #[sqlx(flatten)]
    pub product: Product,
    pub brand_slug: Option<String>,
    pub category_slug: Option<String>,
}

const PRODUCT_COLUMNS: &str = "id, sku, slug, name, brand_id, category_id, price, old_price, \
     description, specs, stock, is_active, is_featured, meta_title, meta_description, \
     created_at, updated_at";

/// Repository for `products`, `product_images` and the `products_fts` index
pub struct ProductRepository;

impl ProductRepository {
    #[tracing::instrument(skip(conn), fields(db.table = "products", db.operation = "select"))]
    pub async fn find_by_sku(
        conn: &mut SqliteConnection,
        sku: &str,
    ) -> Result<Option<Product>, AppError> {
        let query = format!("SELECT {} FROM products WHERE sku = ?", PRODUCT_COLUMNS);
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(sku)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(product)
    }

    #[tracing::instrument(skip(conn), fields(db.table = "products", db.operation = "select"))]
    pub async fn find_by_slug(
        conn: &mut SqliteConnection,
        slug: &str,
    ) -> Result<Option<Product>, AppError> {
        let query = format!("SELECT {} FROM products WHERE slug = ?", PRODUCT_COLUMNS);
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(slug)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(product)
    }

    #[tracing::instrument(skip(conn, fields), fields(db.table = "products", db.operation = "insert", slug = %fields.slug))]
    pub async fn insert(conn: &mut SqliteConnection, fields: &ProductFields) -> Result<i64, AppError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO products (sku, slug, name, brand_id, category_id, price, old_price,
                                  description, specs, stock, is_active, is_featured,
                                  meta_title, meta_description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&fields.sku)
        .bind(&fields.slug)
        .bind(&fields.name)
        .bind(fields.brand_id)
        .bind(fields.category_id)
        .bind(fields.price)
        .bind(fields.old_price)
        .bind(&fields.description)
        .bind(&fields.specs)
        .bind(fields.stock)
        .bind(fields.is_active)
        .bind(fields.is_featured)
        .bind(&fields.meta_title)
        .bind(&fields.meta_description)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    #[tracing::instrument(skip(conn, fields), fields(db.table = "products", db.operation = "update", db.record_id = id))]
    pub async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        fields: &ProductFields,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE products
            SET sku = ?, slug = ?, name = ?, brand_id = ?, category_id = ?, price = ?,
                old_price = ?, description = ?, specs = ?, stock = ?, is_active = ?,
                is_featured = ?, meta_title = ?, meta_description = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&fields.sku)
        .bind(&fields.slug)
        .bind(&fields.name)
        .bind(fields.brand_id)
        .bind(fields.category_id)
        .bind(fields.price)
        .bind(fields.old_price)
        .bind(&fields.description)
        .bind(&fields.specs)
        .bind(fields.stock)
        .bind(fields.is_active)
        .bind(fields.is_featured)
        .bind(&fields.meta_title)
        .bind(&fields.meta_description)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Delete every image row of the product and insert `images` in order.
    #[tracing::instrument(skip(conn, images), fields(db.table = "product_images", db.operation = "replace", db.record_id = product_id, count = images.len()))]
    pub async fn replace_images(
        conn: &mut SqliteConnection,
        product_id: i64,
        images: &[NewProductImage],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM product_images WHERE product_id = ?")
            .bind(product_id)
            .execute(&mut *conn)
            .await?;

        for (position, image) in images.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO product_images (product_id, url, thumb_url, alt, sort_order, is_main)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(product_id)
            .bind(&image.url)
            .bind(&image.thumb_url)
            .bind(&image.alt)
            .bind(position as i64)
            .bind(image.is_main)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    pub async fn list_images(
        conn: &mut SqliteConnection,
        product_id: i64,
    ) -> Result<Vec<ProductImage>, AppError> {
        let images = sqlx::query_as::<_, ProductImage>(
            r#"
            SELECT id, product_id, url, thumb_url, alt, sort_order, is_main
            FROM product_images WHERE product_id = ?
            ORDER BY sort_order ASC, id ASC
            "#,
        )
        .bind(product_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(images)
    }

    pub async fn list_all_images(conn: &mut SqliteConnection) -> Result<Vec<ProductImage>, AppError> {
        let images = sqlx::query_as::<_, ProductImage>(
            r#"
            SELECT id, product_id, url, thumb_url, alt, sort_order, is_main
            FROM product_images
            ORDER BY product_id ASC, sort_order ASC, id ASC
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(images)
    }

    pub async fn list_keys(conn: &mut SqliteConnection) -> Result<Vec<ProductKey>, AppError> {
        let keys = sqlx::query_as::<_, ProductKey>(
            "SELECT id, sku, slug, name FROM products ORDER BY id ASC",
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(keys)
    }

    pub async fn list_for_export(
        conn: &mut SqliteConnection,
    ) -> Result<Vec<ProductExportRow>, AppError> {
        let rows = sqlx::query_as::<_, ProductExportRow>(
            r#"
            SELECT p.id, p.sku, p.slug, p.name, p.brand_id, p.category_id, p.price, p.old_price,
                   p.description, p.specs, p.stock, p.is_active, p.is_featured, p.meta_title,
                   p.meta_description, p.created_at, p.updated_at,
                   b.slug AS brand_slug, c.slug AS category_slug
            FROM products p
            LEFT JOIN brands b ON b.id = p.brand_id
            LEFT JOIN categories c ON c.id = p.category_id
            ORDER BY p.id ASC
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows)
    }

    /// Rebuild the external-content full-text index from the products table.
    #[tracing::instrument(skip(conn), fields(db.table = "products_fts", db.operation = "rebuild"))]
    pub async fn rebuild_search_index(conn: &mut SqliteConnection) -> Result<(), AppError> {
        sqlx::query("INSERT INTO products_fts(products_fts) VALUES('rebuild')")
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}
