//! # Product Repository
//!
//! Catalogue reads and inserts. Stock levels are read here but only ever
//! written through
//! [`StockMovementRepository`](crate::repository::stock_movement::StockMovementRepository).

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::Product;

const PRODUCT_COLUMNS: &str = r#"
    id, vendor_id, sku, name, price_cents, mrp_cents, stock, is_active,
    created_at, updated_at
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let product = db.products().get_by_id("uuid-here").await?;
/// let level = db.products().stock_level("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists a vendor's active products by name.
    pub async fn list_for_vendor(&self, vendor_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE vendor_id = ?1 AND is_active = 1 ORDER BY name"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(vendor_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Current stock level, `None` if the product doesn't exist.
    pub async fn stock_level(&self, id: &str) -> DbResult<Option<i64>> {
        let stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(stock)
    }

    /// Inserts a new product with its opening stock.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    /// * `Err(DbError::ForeignKeyViolation)` - vendor doesn't exist
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(sku = %product.sku, vendor_id = %product.vendor_id, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, vendor_id, sku, name, price_cents, mrp_cents, stock, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.vendor_id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.mrp_cents)
        .bind(product.stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
