//! # Sales Recorder
//!
//! Fans a paid or delivered order out into one sales record per order line,
//! exactly once per order.
//!
//! ## Recording an Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_sales_for_order(order_id)                                       │
//! │                                                                         │
//! │  1. load order + lines                   ✗ → OrderNotFound              │
//! │  2. any sales record for order?          ✓ → AlreadyRecorded            │
//! │  3. INSERT claim (order_reconciliations) ✗ → AlreadyRecorded            │
//! │  4. for each line, in order:                                            │
//! │       quantity, price, product, vendor   ✗ → warn, skip line            │
//! │       SaleAmounts::compute(price, qty, rate)                            │
//! │       INSERT sales_record (order_item_id UNIQUE)                        │
//! │       vendor.auto_stock_deduction?                                      │
//! │         └─► StockLedger out/qty          ✗ → warn, record kept          │
//! │  5. VendorStats::recompute once per vendor touched (failures logged)    │
//! │  6. claim → completed | partial                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `partial` claim can be finished later with
//! [`SalesRecorder::resume_sales_for_order`], which only visits lines that
//! have no record yet. The same call takes over an `in_progress` claim whose
//! pass never finished, once it is older than the claim lease.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use bazaar_core::validation::{validate_price_cents, validate_quantity};
use bazaar_core::{
    CommissionRate, MovementType, Order, OrderItem, PaymentMethod, ReconciliationStatus, SaleAmounts,
    SaleStatus, SaleType, SalesRecord,
};
use bazaar_db::repository::generate_id;
use bazaar_db::Database;

use crate::error::{LedgerError, LedgerResult};
use crate::stats::{SqliteVendorStats, VendorStats};
use crate::stock_ledger::{MovementContext, StockLedger};

// =============================================================================
// Results
// =============================================================================

/// An order line that produced no sales record in this pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedLine {
    pub order_item_id: String,
    pub product_id: String,
    pub reason: String,
}

/// Outcome of one recording (or resume) pass over an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedSales {
    pub order_id: String,
    pub created_records: Vec<SalesRecord>,
    pub skipped_lines: Vec<SkippedLine>,
    /// Lines already recorded before this pass (non-zero only on resume).
    pub previously_recorded: usize,
    pub line_count: usize,
}

impl RecordedSales {
    /// Every line of the order now has a sales record.
    pub fn is_complete(&self) -> bool {
        self.previously_recorded + self.created_records.len() == self.line_count
    }

    fn claim_status(&self) -> ReconciliationStatus {
        if self.is_complete() {
            ReconciliationStatus::Completed
        } else {
            ReconciliationStatus::Partial
        }
    }
}

/// A vendor-entered in-store sale.
#[derive(Debug, Clone)]
pub struct OfflineSale {
    pub vendor_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Defaults to the product's current price.
    pub unit_price_cents: Option<i64>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub actor: Option<String>,
}

impl OfflineSale {
    pub fn new(vendor_id: impl Into<String>, product_id: impl Into<String>, quantity: i64) -> Self {
        OfflineSale {
            vendor_id: vendor_id.into(),
            product_id: product_id.into(),
            quantity,
            unit_price_cents: None,
            payment_method: PaymentMethod::Cash,
            notes: None,
            actor: None,
        }
    }
}

// =============================================================================
// Recorder
// =============================================================================

/// How long a pass may hold an unfinished claim before resume takes it over.
pub const DEFAULT_CLAIM_LEASE_SECS: i64 = 300;

#[derive(Clone)]
pub struct SalesRecorder {
    db: Database,
    rate: CommissionRate,
    claim_lease: Duration,
    stock: StockLedger,
    stats: Arc<dyn VendorStats>,
}

impl SalesRecorder {
    pub fn new(db: Database, rate: CommissionRate) -> Self {
        SalesRecorder {
            stock: StockLedger::new(db.clone()),
            stats: Arc::new(SqliteVendorStats::new(db.clone())),
            claim_lease: Duration::seconds(DEFAULT_CLAIM_LEASE_SECS),
            db,
            rate,
        }
    }

    pub fn with_claim_lease(mut self, lease: Duration) -> Self {
        self.claim_lease = lease;
        self
    }

    /// Replaces the vendor statistics collaborator.
    pub fn with_stats(mut self, stats: Arc<dyn VendorStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn commission_rate(&self) -> CommissionRate {
        self.rate
    }

    /// Records every line of a paid or delivered order.
    ///
    /// ## Returns
    /// * `Ok(RecordedSales)` - possibly with skipped lines; check
    ///   [`RecordedSales::is_complete`]
    /// * `Err(AlreadyRecorded)` - a previous or concurrent call owns the order
    /// * `Err(OrderNotFound)` / `Err(Store)` - nothing was written
    pub async fn record_sales_for_order(&self, order_id: &str) -> LedgerResult<RecordedSales> {
        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| LedgerError::OrderNotFound(order_id.to_string()))?;

        if self.db.sales_records().exists_for_order(order_id).await? {
            debug!(order_id = %order_id, "Sales records already exist");
            return Err(LedgerError::AlreadyRecorded {
                order_id: order_id.to_string(),
            });
        }

        let claimed = self
            .db
            .reconciliations()
            .try_claim(order_id, order.items.len() as i64, Utc::now())
            .await?;
        if !claimed {
            debug!(order_id = %order_id, "Order already claimed for recording");
            return Err(LedgerError::AlreadyRecorded {
                order_id: order_id.to_string(),
            });
        }

        let lines: Vec<&OrderItem> = order.items.iter().collect();
        self.run(&order, &lines, 0).await
    }

    /// Finishes an order left `partial` by an earlier pass, or one whose
    /// pass died holding the claim for longer than the lease.
    pub async fn resume_sales_for_order(&self, order_id: &str) -> LedgerResult<RecordedSales> {
        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| LedgerError::OrderNotFound(order_id.to_string()))?;

        let claims = self.db.reconciliations();
        let now = Utc::now();
        if !claims.reopen(order_id, now - self.claim_lease, now).await? {
            let reason = match claims.get(order_id).await? {
                None => "no recording has been attempted",
                Some(claim) if claim.status == ReconciliationStatus::Completed => {
                    "every line is already recorded"
                }
                Some(claim) if claim.status == ReconciliationStatus::InProgress => {
                    "a recording pass is in progress"
                }
                Some(_) => "another caller resumed it first",
            };
            return Err(LedgerError::NotResumable {
                order_id: order_id.to_string(),
                reason: reason.to_string(),
            });
        }

        let recorded: HashSet<String> = self
            .db
            .sales_records()
            .recorded_item_ids(order_id)
            .await?
            .into_iter()
            .collect();
        let pending: Vec<&OrderItem> = order
            .items
            .iter()
            .filter(|item| !recorded.contains(&item.id))
            .collect();

        info!(
            order_id = %order_id,
            already_recorded = recorded.len(),
            pending = pending.len(),
            "Resuming sales recording"
        );

        self.run(&order, &pending, recorded.len()).await
    }

    /// Processes `lines` sequentially, then updates stats and the claim.
    async fn run(
        &self,
        order: &Order,
        lines: &[&OrderItem],
        previously_recorded: usize,
    ) -> LedgerResult<RecordedSales> {
        let mut outcome = RecordedSales {
            order_id: order.id.clone(),
            created_records: Vec::with_capacity(lines.len()),
            skipped_lines: Vec::new(),
            previously_recorded,
            line_count: order.items.len(),
        };

        for item in lines {
            match self.record_line(order, item).await {
                Ok(record) => outcome.created_records.push(record),
                Err(err) => {
                    warn!(
                        order_id = %order.id,
                        order_item_id = %item.id,
                        product_id = %item.product_id,
                        error = %err,
                        "Skipping order line"
                    );
                    outcome.skipped_lines.push(SkippedLine {
                        order_item_id: item.id.clone(),
                        product_id: item.product_id.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let vendors: BTreeSet<&str> = outcome
            .created_records
            .iter()
            .map(|record| record.vendor_id.as_str())
            .collect();
        for vendor_id in vendors {
            self.refresh_stats(vendor_id).await;
        }

        let recorded_count = (outcome.previously_recorded + outcome.created_records.len()) as i64;
        if let Err(err) = self
            .db
            .reconciliations()
            .finish(&order.id, outcome.claim_status(), recorded_count, Utc::now())
            .await
        {
            error!(
                order_id = %order.id,
                created = outcome.created_records.len(),
                error = %err,
                "Claim left in progress; resumable once the lease expires"
            );
            return Err(err.into());
        }

        info!(
            order_id = %order.id,
            created = outcome.created_records.len(),
            skipped = outcome.skipped_lines.len(),
            line_count = outcome.line_count,
            complete = outcome.is_complete(),
            "Sales recorded for order"
        );

        Ok(outcome)
    }

    /// Records one order line. Stock failures are logged, never returned.
    async fn record_line(&self, order: &Order, item: &OrderItem) -> LedgerResult<SalesRecord> {
        validate_quantity(item.quantity)?;
        validate_price_cents(item.unit_price_cents)?;

        let product = self
            .db
            .products()
            .get_by_id(&item.product_id)
            .await?
            .ok_or_else(|| LedgerError::ProductNotFound(item.product_id.clone()))?;

        let vendor = self
            .db
            .vendors()
            .get_by_id(&product.vendor_id)
            .await?
            .ok_or_else(|| LedgerError::VendorNotFound(product.vendor_id.clone()))?;

        let amounts = SaleAmounts::compute(item.unit_price(), item.quantity, self.rate);
        let record = SalesRecord {
            id: generate_id(),
            vendor_id: vendor.id.clone(),
            product_id: product.id.clone(),
            order_id: Some(order.id.clone()),
            order_item_id: Some(item.id.clone()),
            sale_type: SaleType::Online,
            quantity: item.quantity,
            unit_price_cents: amounts.unit_price.cents(),
            total_amount_cents: amounts.sale_amount.cents(),
            platform_commission_cents: amounts.platform_commission.cents(),
            net_amount_cents: amounts.net_amount.cents(),
            commission_rate_bps: i64::from(self.rate.bps()),
            payment_method: order.payment_method,
            status: SaleStatus::Completed,
            sale_date: order.created_at,
            notes: None,
            created_at: Utc::now(),
        };
        self.db.sales_records().insert(&record).await?;

        if vendor.auto_stock_deduction {
            let deducted = self
                .stock
                .apply_stock_movement(
                    &product.id,
                    &vendor.id,
                    MovementType::Out,
                    item.quantity,
                    MovementContext::online_order(&order.id),
                )
                .await;
            if let Err(err) = deducted {
                warn!(
                    order_id = %order.id,
                    product_id = %product.id,
                    quantity = item.quantity,
                    error = %err,
                    "Sale recorded without stock deduction"
                );
            }
        }

        Ok(record)
    }

    /// Records an in-store sale entered by the vendor.
    ///
    /// Unlike the online path, a stock failure aborts the sale before the
    /// record is written.
    pub async fn record_offline_sale(&self, sale: OfflineSale) -> LedgerResult<SalesRecord> {
        validate_quantity(sale.quantity)?;
        if let Some(price) = sale.unit_price_cents {
            validate_price_cents(price)?;
        }

        let product = self
            .db
            .products()
            .get_by_id(&sale.product_id)
            .await?
            .ok_or_else(|| LedgerError::ProductNotFound(sale.product_id.clone()))?;

        let vendor = self
            .db
            .vendors()
            .get_by_id(&sale.vendor_id)
            .await?
            .ok_or_else(|| LedgerError::VendorNotFound(sale.vendor_id.clone()))?;

        if product.vendor_id != vendor.id {
            return Err(LedgerError::VendorMismatch {
                product_id: product.id,
                vendor_id: vendor.id,
                owner: product.vendor_id,
            });
        }

        let unit_price = sale
            .unit_price_cents
            .map(bazaar_core::Money::from_cents)
            .unwrap_or_else(|| product.price());
        let amounts = SaleAmounts::compute(unit_price, sale.quantity, self.rate);
        let now = Utc::now();

        let record = SalesRecord {
            id: generate_id(),
            vendor_id: vendor.id.clone(),
            product_id: product.id.clone(),
            order_id: None,
            order_item_id: None,
            sale_type: SaleType::Offline,
            quantity: sale.quantity,
            unit_price_cents: amounts.unit_price.cents(),
            total_amount_cents: amounts.sale_amount.cents(),
            platform_commission_cents: amounts.platform_commission.cents(),
            net_amount_cents: amounts.net_amount.cents(),
            commission_rate_bps: i64::from(self.rate.bps()),
            payment_method: sale.payment_method,
            status: SaleStatus::Completed,
            sale_date: now,
            notes: sale.notes,
            created_at: now,
        };

        if vendor.auto_stock_deduction {
            self.stock
                .apply_stock_movement(
                    &product.id,
                    &vendor.id,
                    MovementType::Out,
                    sale.quantity,
                    MovementContext::offline_sale(&record.id, sale.actor.as_deref()),
                )
                .await?;
        }

        if let Err(err) = self.db.sales_records().insert(&record).await {
            error!(
                record_id = %record.id,
                product_id = %product.id,
                error = %err,
                "Offline sale insert failed"
            );
            if vendor.auto_stock_deduction {
                self.restore_stock(&record, sale.actor.as_deref()).await;
            }
            return Err(err.into());
        }

        self.refresh_stats(&vendor.id).await;

        info!(
            record_id = %record.id,
            vendor_id = %vendor.id,
            product_id = %product.id,
            quantity = record.quantity,
            total_amount_cents = record.total_amount_cents,
            "Offline sale recorded"
        );
        Ok(record)
    }

    /// Compensating `return` movement for an offline sale that wasn't saved.
    async fn restore_stock(&self, record: &SalesRecord, actor: Option<&str>) {
        let context = MovementContext {
            reason: format!("Reversal of offline sale {}", record.id),
            ..MovementContext::offline_sale(&record.id, actor)
        };
        let restored = self
            .stock
            .apply_stock_movement(
                &record.product_id,
                &record.vendor_id,
                MovementType::Return,
                record.quantity,
                context,
            )
            .await;
        if let Err(err) = restored {
            error!(
                record_id = %record.id,
                product_id = %record.product_id,
                error = %err,
                "Stock reversal failed"
            );
        }
    }

    async fn refresh_stats(&self, vendor_id: &str) {
        if let Err(err) = self.stats.recompute(vendor_id).await {
            warn!(vendor_id = %vendor_id, error = %err, "Vendor stats recompute failed");
        }
    }
}
