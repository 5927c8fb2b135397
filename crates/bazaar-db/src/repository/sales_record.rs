//! # Sales Record Repository
//!
//! Per-vendor sales records and the order breakdown projection.
//!
//! ## One Record Per Line
//! ```text
//! order_items.id ──► sales_records.order_item_id  (UNIQUE)
//!
//! second insert for the same line → DbError::UniqueViolation
//! offline sales carry NULL order_item_id (unconstrained)
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::{SalesRecord, VendorSalesBreakdown};

const RECORD_COLUMNS: &str = r#"
    id, vendor_id, product_id, order_id, order_item_id, sale_type, quantity,
    unit_price_cents, total_amount_cents, platform_commission_cents, net_amount_cents,
    commission_rate_bps, payment_method, status, sale_date, notes, created_at
"#;

#[derive(Debug, Clone)]
pub struct SalesRecordRepository {
    pool: SqlitePool,
}

impl SalesRecordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SalesRecordRepository { pool }
    }

    /// Inserts a sales record.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - the order line already has a record
    /// * `Err(DbError::CheckViolation)` - commission + net != total
    pub async fn insert(&self, record: &SalesRecord) -> DbResult<()> {
        debug!(
            id = %record.id,
            vendor_id = %record.vendor_id,
            order_item_id = ?record.order_item_id,
            total_amount_cents = record.total_amount_cents,
            "Inserting sales record"
        );

        sqlx::query(
            r#"
            INSERT INTO sales_records (
                id, vendor_id, product_id, order_id, order_item_id, sale_type, quantity,
                unit_price_cents, total_amount_cents, platform_commission_cents, net_amount_cents,
                commission_rate_bps, payment_method, status, sale_date, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
        )
        .bind(&record.id)
        .bind(&record.vendor_id)
        .bind(&record.product_id)
        .bind(&record.order_id)
        .bind(&record.order_item_id)
        .bind(record.sale_type)
        .bind(record.quantity)
        .bind(record.unit_price_cents)
        .bind(record.total_amount_cents)
        .bind(record.platform_commission_cents)
        .bind(record.net_amount_cents)
        .bind(record.commission_rate_bps)
        .bind(record.payment_method)
        .bind(record.status)
        .bind(record.sale_date)
        .bind(&record.notes)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Whether any record references the order.
    pub async fn exists_for_order(&self, order_id: &str) -> DbResult<bool> {
        let exists: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM sales_records WHERE order_id = ?1)")
                .bind(order_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists != 0)
    }

    /// All records of an order, in insertion order.
    pub async fn list_for_order(&self, order_id: &str) -> DbResult<Vec<SalesRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM sales_records WHERE order_id = ?1 ORDER BY rowid"
        );
        let records = sqlx::query_as::<_, SalesRecord>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// A vendor's most recent records.
    pub async fn list_for_vendor(&self, vendor_id: &str, limit: u32) -> DbResult<Vec<SalesRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM sales_records WHERE vendor_id = ?1 ORDER BY rowid DESC LIMIT ?2"
        );
        let records = sqlx::query_as::<_, SalesRecord>(&sql)
            .bind(vendor_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Order line IDs of the order that already have a record.
    pub async fn recorded_item_ids(&self, order_id: &str) -> DbResult<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT order_item_id FROM sales_records WHERE order_id = ?1 AND order_item_id IS NOT NULL",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Per-vendor totals for one order, grouped and ordered by vendor.
    pub async fn breakdown_rows(&self, order_id: &str) -> DbResult<Vec<VendorSalesBreakdown>> {
        let rows = sqlx::query_as::<_, VendorSalesBreakdown>(
            r#"
            SELECT
                s.vendor_id                       AS vendor_id,
                v.business_name                   AS business_name,
                SUM(s.quantity)                   AS quantity,
                SUM(s.total_amount_cents)         AS total_sales_cents,
                SUM(s.platform_commission_cents)  AS total_commission_cents,
                SUM(s.net_amount_cents)           AS net_amount_cents,
                COUNT(*)                          AS record_count
            FROM sales_records s
            LEFT JOIN vendors v ON v.id = s.vendor_id
            WHERE s.order_id = ?1
            GROUP BY s.vendor_id, v.business_name
            ORDER BY s.vendor_id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
