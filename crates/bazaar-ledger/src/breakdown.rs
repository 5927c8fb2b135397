//! Per-order sales breakdown for admin reporting.

use bazaar_core::SalesBreakdown;
use bazaar_db::Database;

use crate::error::LedgerResult;

/// Totals and per-vendor rows for an order's recorded sales.
///
/// `None` means nothing has been recorded for the order yet.
pub async fn sales_breakdown(db: &Database, order_id: &str) -> LedgerResult<Option<SalesBreakdown>> {
    let rows = db.sales_records().breakdown_rows(order_id).await?;
    if rows.is_empty() {
        return Ok(None);
    }

    Ok(Some(SalesBreakdown::from_vendor_rows(order_id, rows)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[tokio::test]
    async fn test_two_vendor_order() {
        let db = test_db().await;
        let loom = seed_vendor(&db, "Loom", false).await;
        let clay = seed_vendor(&db, "Clay", false).await;
        let shawl = seed_product(&db, &loom, "SHAWL-01", 20_000, 10).await;
        let mug = seed_product(&db, &clay, "MUG-01", 5_000, 10).await;
        let order = seed_order(&db, &[(&shawl, 2), (&mug, 5)]).await;

        let outcome = recorder(&db).record_sales_for_order(&order.id).await.unwrap();
        assert_eq!(outcome.created_records.len(), 2);

        let loom_record = outcome
            .created_records
            .iter()
            .find(|r| r.vendor_id == loom.id)
            .unwrap();
        assert_eq!(loom_record.total_amount_cents, 40_000);
        assert_eq!(loom_record.platform_commission_cents, 2_000);
        assert_eq!(loom_record.net_amount_cents, 38_000);

        let clay_record = outcome
            .created_records
            .iter()
            .find(|r| r.vendor_id == clay.id)
            .unwrap();
        assert_eq!(clay_record.total_amount_cents, 25_000);
        assert_eq!(clay_record.platform_commission_cents, 1_250);
        assert_eq!(clay_record.net_amount_cents, 23_750);

        let breakdown = sales_breakdown(&db, &order.id).await.unwrap().unwrap();
        assert_eq!(breakdown.total_sales_cents, 65_000);
        assert_eq!(breakdown.total_commission_cents, 3_250);
        assert_eq!(breakdown.total_net_to_vendors_cents, 61_750);
        assert_eq!(breakdown.vendors.len(), 2);

        let clay_row = breakdown.vendors.iter().find(|v| v.vendor_id == clay.id).unwrap();
        assert_eq!(clay_row.business_name.as_deref(), Some("Clay"));
        assert_eq!(clay_row.quantity, 5);
        assert_eq!(clay_row.record_count, 1);
    }

    #[tokio::test]
    async fn test_unrecorded_order_has_no_breakdown() {
        let db = test_db().await;
        let loom = seed_vendor(&db, "Loom", false).await;
        let shawl = seed_product(&db, &loom, "SHAWL-01", 20_000, 10).await;
        let order = seed_order(&db, &[(&shawl, 1)]).await;

        assert!(sales_breakdown(&db, &order.id).await.unwrap().is_none());
        assert!(sales_breakdown(&db, "missing").await.unwrap().is_none());
    }
}
