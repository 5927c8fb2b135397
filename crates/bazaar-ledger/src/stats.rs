//! # Vendor Statistics Collaborator
//!
//! "Given a vendor id, recompute and persist cumulative sales totals."
//!
//! The recorder calls this once per distinct vendor after its lines are
//! processed. A failure is logged by the caller and never undoes recorded
//! sales.

use async_trait::async_trait;
use tracing::debug;

use bazaar_core::VendorSalesStats;
use bazaar_db::Database;

use crate::error::LedgerResult;

#[async_trait]
pub trait VendorStats: Send + Sync {
    /// Recomputes and persists the vendor's totals, returning them.
    async fn recompute(&self, vendor_id: &str) -> LedgerResult<VendorSalesStats>;
}

/// Recomputes from completed sales records in SQLite.
#[derive(Debug, Clone)]
pub struct SqliteVendorStats {
    db: Database,
}

impl SqliteVendorStats {
    pub fn new(db: Database) -> Self {
        SqliteVendorStats { db }
    }
}

#[async_trait]
impl VendorStats for SqliteVendorStats {
    async fn recompute(&self, vendor_id: &str) -> LedgerResult<VendorSalesStats> {
        let vendors = self.db.vendors();
        let stats = vendors.sales_stats(vendor_id).await?;
        vendors.store_stats(vendor_id, &stats).await?;

        debug!(
            vendor_id = %vendor_id,
            total_sales_cents = stats.total_sales_cents,
            total_orders = stats.total_orders,
            "Vendor stats recomputed"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[tokio::test]
    async fn test_recompute_from_records() {
        let db = test_db().await;
        let loom = seed_vendor(&db, "Loom", false).await;
        let scarf = seed_product(&db, &loom, "SCARF-01", 20_000, 10).await;
        let first = seed_order(&db, &[(&scarf, 2)]).await;
        let second = seed_order(&db, &[(&scarf, 1)]).await;

        let recorder = recorder(&db);
        recorder.record_sales_for_order(&first.id).await.unwrap();
        recorder.record_sales_for_order(&second.id).await.unwrap();

        let stats = SqliteVendorStats::new(db.clone())
            .recompute(&loom.id)
            .await
            .unwrap();
        assert_eq!(stats.total_sales_cents, 60_000);
        assert_eq!(stats.total_commission_cents, 3_000);
        assert_eq!(stats.total_net_cents, 57_000);
        assert_eq!(stats.total_orders, 2);

        let stored = db.vendors().get_by_id(&loom.id).await.unwrap().unwrap();
        assert_eq!(stored.stats(), stats);
    }

    #[tokio::test]
    async fn test_recompute_unknown_vendor_fails() {
        let db = test_db().await;
        let result = SqliteVendorStats::new(db).recompute("missing").await;
        assert!(result.is_err());
    }
}
