//! # Vendor Repository
//!
//! Vendor reads and the cumulative stats recompute.
//!
//! ## Stats Recompute
//! ```text
//! sales_records (status = completed, vendor_id = ?)
//!      │  SUM(total_amount_cents)        → total_sales_cents
//!      │  SUM(platform_commission_cents) → total_commission_cents
//!      │  SUM(net_amount_cents)          → total_net_cents
//!      │  distinct orders + offline sales → total_orders
//!      ▼
//! vendors row (overwritten, never incremented)
//! ```
//!
//! Recomputing from the records instead of incrementing keeps the columns
//! correct when the same vendor is recomputed twice or concurrently.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use bazaar_core::{Vendor, VendorSalesStats};

#[derive(Debug, Clone)]
pub struct VendorRepository {
    pool: SqlitePool,
}

impl VendorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        VendorRepository { pool }
    }

    /// Gets a vendor by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Vendor>> {
        let vendor = sqlx::query_as::<_, Vendor>(
            r#"
            SELECT
                id, business_name, email, auto_stock_deduction, is_active,
                total_sales_cents, total_commission_cents, total_net_cents, total_orders,
                created_at, updated_at
            FROM vendors
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vendor)
    }

    /// Inserts a new vendor.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - email already registered
    pub async fn insert(&self, vendor: &Vendor) -> DbResult<()> {
        debug!(id = %vendor.id, business_name = %vendor.business_name, "Inserting vendor");

        sqlx::query(
            r#"
            INSERT INTO vendors (
                id, business_name, email, auto_stock_deduction, is_active,
                total_sales_cents, total_commission_cents, total_net_cents, total_orders,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&vendor.id)
        .bind(&vendor.business_name)
        .bind(&vendor.email)
        .bind(vendor.auto_stock_deduction)
        .bind(vendor.is_active)
        .bind(vendor.total_sales_cents)
        .bind(vendor.total_commission_cents)
        .bind(vendor.total_net_cents)
        .bind(vendor.total_orders)
        .bind(vendor.created_at)
        .bind(vendor.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Turns automatic stock deduction on or off.
    pub async fn set_auto_stock_deduction(&self, id: &str, enabled: bool) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE vendors SET auto_stock_deduction = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(enabled)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Vendor", id));
        }

        Ok(())
    }

    /// Aggregates a vendor's completed sales records.
    pub async fn sales_stats(&self, vendor_id: &str) -> DbResult<VendorSalesStats> {
        let stats = sqlx::query_as::<_, VendorSalesStats>(
            r#"
            SELECT
                COALESCE(SUM(total_amount_cents), 0)        AS total_sales_cents,
                COALESCE(SUM(platform_commission_cents), 0) AS total_commission_cents,
                COALESCE(SUM(net_amount_cents), 0)          AS total_net_cents,
                COUNT(DISTINCT order_id)
                    + COALESCE(SUM(CASE WHEN order_id IS NULL THEN 1 ELSE 0 END), 0)
                                                            AS total_orders
            FROM sales_records
            WHERE vendor_id = ?1 AND status = 'completed'
            "#,
        )
        .bind(vendor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    /// Overwrites the vendor's cumulative stats columns.
    pub async fn store_stats(&self, vendor_id: &str, stats: &VendorSalesStats) -> DbResult<()> {
        debug!(
            vendor_id = %vendor_id,
            total_sales_cents = stats.total_sales_cents,
            total_orders = stats.total_orders,
            "Storing vendor stats"
        );

        let result = sqlx::query(
            r#"
            UPDATE vendors SET
                total_sales_cents = ?2,
                total_commission_cents = ?3,
                total_net_cents = ?4,
                total_orders = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(vendor_id)
        .bind(stats.total_sales_cents)
        .bind(stats.total_commission_cents)
        .bind(stats.total_net_cents)
        .bind(stats.total_orders)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Vendor", vendor_id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let vendor = seed_vendor(&db, "Loom", true).await;

        let loaded = db.vendors().get_by_id(&vendor.id).await.unwrap().unwrap();
        assert_eq!(loaded.business_name, "Loom");
        assert!(loaded.auto_stock_deduction);
        assert_eq!(loaded.total_orders, 0);

        assert!(db.vendors().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = test_db().await;
        let vendor = seed_vendor(&db, "Loom", false).await;

        let twin = Vendor::new("Loom Two", vendor.email.clone());
        let err = db.vendors().insert(&twin).await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_stats_empty_vendor() {
        let db = test_db().await;
        let vendor = seed_vendor(&db, "Clay", false).await;

        let stats = db.vendors().sales_stats(&vendor.id).await.unwrap();
        assert_eq!(stats, VendorSalesStats::default());
    }

    #[tokio::test]
    async fn test_store_stats() {
        let db = test_db().await;
        let vendor = seed_vendor(&db, "Clay", false).await;

        let stats = VendorSalesStats {
            total_sales_cents: 25_000,
            total_commission_cents: 1_250,
            total_net_cents: 23_750,
            total_orders: 1,
        };
        db.vendors().store_stats(&vendor.id, &stats).await.unwrap();

        let loaded = db.vendors().get_by_id(&vendor.id).await.unwrap().unwrap();
        assert_eq!(loaded.stats(), stats);

        let err = db.vendors().store_stats("missing", &stats).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_toggle_auto_stock() {
        let db = test_db().await;
        let vendor = seed_vendor(&db, "Clay", false).await;

        db.vendors().set_auto_stock_deduction(&vendor.id, true).await.unwrap();
        let loaded = db.vendors().get_by_id(&vendor.id).await.unwrap().unwrap();
        assert!(loaded.auto_stock_deduction);
    }
}
