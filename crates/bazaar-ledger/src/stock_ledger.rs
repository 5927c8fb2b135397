//! # Stock Ledger
//!
//! Applies stock changes and appends the immutable movement log.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apply_stock_movement(product, vendor, type, quantity, context)         │
//! │       │                                                                 │
//! │       ├── signed_delta(type, quantity)     ✗ → Core(InvalidQuantity)    │
//! │       ├── validate_reason, unit cost       ✗ → Core(Validation)         │
//! │       ├── product lookup                   ✗ → ProductNotFound          │
//! │       ├── product.vendor_id == vendor      ✗ → VendorMismatch           │
//! │       ├── pre-check against read level     ✗ → InvalidStockState        │
//! │       ▼                                                                 │
//! │  StockMovementRepository::apply (conditional UPDATE + INSERT, one tx)   │
//! │       ├── Applied        → StockMovement                                │
//! │       ├── Insufficient   → InvalidStockState (lost a race)              │
//! │       └── ProductMissing → ProductNotFound                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info};

use bazaar_core::stock::signed_delta;
use bazaar_core::validation::{validate_price_cents, validate_reason};
use bazaar_core::{CoreError, MovementType, ReferenceType, StockChange, StockMovement};
use bazaar_db::{Database, NewStockMovement, StockUpdate};

use crate::error::{LedgerError, LedgerResult};

/// Largest page returned by [`StockLedger::movement_history`].
pub const MAX_HISTORY_LIMIT: u32 = 500;

/// Where a stock change comes from and why.
#[derive(Debug, Clone)]
pub struct MovementContext {
    pub reference_type: ReferenceType,
    pub reference_id: Option<String>,
    pub reason: String,
    pub actor: Option<String>,
    pub unit_cost_cents: Option<i64>,
}

impl MovementContext {
    pub fn online_order(order_id: &str) -> Self {
        MovementContext {
            reference_type: ReferenceType::OnlineOrder,
            reference_id: Some(order_id.to_string()),
            reason: format!("Online order {order_id}"),
            actor: Some("system".to_string()),
            unit_cost_cents: None,
        }
    }

    pub fn offline_sale(record_id: &str, actor: Option<&str>) -> Self {
        MovementContext {
            reference_type: ReferenceType::OfflineSale,
            reference_id: Some(record_id.to_string()),
            reason: format!("Offline sale {record_id}"),
            actor: actor.map(str::to_string),
            unit_cost_cents: None,
        }
    }

    pub fn manual(reason: impl Into<String>, actor: Option<&str>) -> Self {
        MovementContext {
            reference_type: ReferenceType::Manual,
            reference_id: None,
            reason: reason.into(),
            actor: actor.map(str::to_string),
            unit_cost_cents: None,
        }
    }

    pub fn with_unit_cost(mut self, unit_cost_cents: i64) -> Self {
        self.unit_cost_cents = Some(unit_cost_cents);
        self
    }
}

#[derive(Debug, Clone)]
pub struct StockLedger {
    db: Database,
}

impl StockLedger {
    pub fn new(db: Database) -> Self {
        StockLedger { db }
    }

    /// Applies one movement. `quantity` is a magnitude for directional
    /// types and a signed correction for `adjustment`.
    pub async fn apply_stock_movement(
        &self,
        product_id: &str,
        vendor_id: &str,
        movement_type: MovementType,
        quantity: i64,
        context: MovementContext,
    ) -> LedgerResult<StockMovement> {
        let delta = signed_delta(movement_type, quantity)?;
        let reason = validate_reason(&context.reason)?;
        if let Some(cost) = context.unit_cost_cents {
            validate_price_cents(cost)?;
            if cost.checked_mul(delta.abs()).is_none() {
                return Err(CoreError::InvalidQuantity {
                    movement: movement_type.to_string(),
                    quantity,
                }
                .into());
            }
        }

        let product = self
            .db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| LedgerError::ProductNotFound(product_id.to_string()))?;

        if product.vendor_id != vendor_id {
            return Err(LedgerError::VendorMismatch {
                product_id: product_id.to_string(),
                vendor_id: vendor_id.to_string(),
                owner: product.vendor_id,
            });
        }

        StockChange::apply(product_id, product.stock, delta).map_err(stock_error)?;

        let input = NewStockMovement {
            vendor_id: vendor_id.to_string(),
            product_id: product_id.to_string(),
            movement_type,
            delta,
            reference_type: context.reference_type,
            reference_id: context.reference_id,
            reason,
            unit_cost_cents: context.unit_cost_cents,
            created_by: context.actor,
        };

        match self.db.stock_movements().apply(&input).await? {
            StockUpdate::Applied(movement) => {
                debug!(
                    product_id = %product_id,
                    movement_type = %movement_type,
                    previous = movement.previous_stock,
                    new = movement.new_stock,
                    "Stock movement applied"
                );
                Ok(movement)
            }
            StockUpdate::Insufficient { current } => Err(LedgerError::InvalidStockState {
                product_id: product_id.to_string(),
                current,
                delta,
            }),
            StockUpdate::ProductMissing => Err(LedgerError::ProductNotFound(product_id.to_string())),
        }
    }

    /// Manual or administrative stock entry (`reference_type = manual`).
    pub async fn adjust_stock(
        &self,
        product_id: &str,
        vendor_id: &str,
        movement_type: MovementType,
        quantity: i64,
        reason: &str,
        actor: Option<&str>,
    ) -> LedgerResult<StockMovement> {
        info!(
            product_id = %product_id,
            movement_type = %movement_type,
            quantity,
            actor = ?actor,
            "Manual stock adjustment"
        );

        self.apply_stock_movement(
            product_id,
            vendor_id,
            movement_type,
            quantity,
            MovementContext::manual(reason, actor),
        )
        .await
    }

    /// Newest-first movements for a product; `limit` is capped at
    /// [`MAX_HISTORY_LIMIT`].
    pub async fn movement_history(&self, product_id: &str, limit: u32) -> LedgerResult<Vec<StockMovement>> {
        let limit = limit.min(MAX_HISTORY_LIMIT);
        Ok(self
            .db
            .stock_movements()
            .list_for_product(product_id, limit)
            .await?)
    }
}

fn stock_error(err: CoreError) -> LedgerError {
    match err {
        CoreError::InvalidStockState {
            product_id,
            previous,
            delta,
        } => LedgerError::InvalidStockState {
            product_id,
            current: previous,
            delta,
        },
        other => LedgerError::Core(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use bazaar_core::MAX_MOVEMENT_QUANTITY;

    #[tokio::test]
    async fn test_every_movement_satisfies_invariant() {
        let db = test_db().await;
        let vendor = seed_vendor(&db, "Loom", true).await;
        let product = seed_product(&db, &vendor, "SCARF-01", 20_000, 10).await;
        let ledger = StockLedger::new(db.clone());

        let steps = [
            (MovementType::Out, 3),
            (MovementType::In, 5),
            (MovementType::Damage, 1),
            (MovementType::Return, 2),
            (MovementType::Transfer, 4),
            (MovementType::Adjustment, -2),
            (MovementType::Adjustment, 6),
        ];

        for (kind, qty) in steps {
            let movement = ledger
                .adjust_stock(&product.id, &vendor.id, kind, qty, "Stocktake", Some("admin"))
                .await
                .unwrap();
            assert_eq!(movement.new_stock, movement.previous_stock + movement.quantity);
            assert_eq!(movement.quantity, signed_delta(kind, qty).unwrap());
            assert_eq!(movement.reference_type, ReferenceType::Manual);
        }

        // 10 - 3 + 5 - 1 + 2 - 4 - 2 + 6
        assert_eq!(db.products().stock_level(&product.id).await.unwrap(), Some(13));
    }

    #[tokio::test]
    async fn test_outbound_below_zero_rejected() {
        let db = test_db().await;
        let vendor = seed_vendor(&db, "Loom", true).await;
        let product = seed_product(&db, &vendor, "SCARF-01", 20_000, 2).await;
        let ledger = StockLedger::new(db.clone());

        let err = ledger
            .adjust_stock(&product.id, &vendor.id, MovementType::Damage, 3, "Water damage", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidStockState { current: 2, delta: -3, .. }
        ));

        let err = ledger
            .adjust_stock(&product.id, &vendor.id, MovementType::Adjustment, -5, "Recount", None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidStockState { .. }));

        assert_eq!(db.products().stock_level(&product.id).await.unwrap(), Some(2));
        assert!(ledger.movement_history(&product.id, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_input_validation() {
        let db = test_db().await;
        let vendor = seed_vendor(&db, "Loom", true).await;
        let other = seed_vendor(&db, "Clay", true).await;
        let product = seed_product(&db, &vendor, "SCARF-01", 20_000, 5).await;
        let ledger = StockLedger::new(db.clone());

        let err = ledger
            .adjust_stock(&product.id, &vendor.id, MovementType::In, 0, "Restock", None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::InvalidQuantity { .. })));

        let err = ledger
            .adjust_stock(&product.id, &vendor.id, MovementType::In, 1, "   ", None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::Validation(_))));

        let err = ledger
            .adjust_stock("missing", &vendor.id, MovementType::In, 1, "Restock", None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::ProductNotFound(_)));

        let err = ledger
            .adjust_stock(&product.id, &other.id, MovementType::In, 1, "Restock", None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::VendorMismatch { .. }));
    }

    #[tokio::test]
    async fn test_unbounded_quantities_rejected() {
        let db = test_db().await;
        let vendor = seed_vendor(&db, "Loom", true).await;
        let product = seed_product(&db, &vendor, "SCARF-01", 20_000, 10).await;
        let ledger = StockLedger::new(db.clone());

        for (kind, qty) in [
            (MovementType::In, i64::MAX),
            (MovementType::Adjustment, i64::MIN),
            (MovementType::Out, MAX_MOVEMENT_QUANTITY + 1),
        ] {
            let err = ledger
                .adjust_stock(&product.id, &vendor.id, kind, qty, "Restock", None)
                .await
                .unwrap_err();
            assert!(matches!(err, LedgerError::Core(CoreError::InvalidQuantity { .. })));
        }

        let err = ledger
            .apply_stock_movement(
                &product.id,
                &vendor.id,
                MovementType::In,
                2,
                MovementContext::manual("Restock", None).with_unit_cost(i64::MAX),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::InvalidQuantity { .. })));

        let err = ledger
            .apply_stock_movement(
                &product.id,
                &vendor.id,
                MovementType::In,
                2,
                MovementContext::manual("Restock", None).with_unit_cost(-1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::Validation(_))));

        ledger
            .adjust_stock(&product.id, &vendor.id, MovementType::In, MAX_MOVEMENT_QUANTITY, "Bulk restock", None)
            .await
            .unwrap();
        assert_eq!(
            db.products().stock_level(&product.id).await.unwrap(),
            Some(10 + MAX_MOVEMENT_QUANTITY)
        );
        assert_eq!(ledger.movement_history(&product.id, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_history_and_costs() {
        let db = test_db().await;
        let vendor = seed_vendor(&db, "Loom", true).await;
        let product = seed_product(&db, &vendor, "SCARF-01", 20_000, 0).await;
        let ledger = StockLedger::new(db.clone());

        ledger
            .apply_stock_movement(
                &product.id,
                &vendor.id,
                MovementType::In,
                4,
                MovementContext::manual("Restock", Some("vendor")).with_unit_cost(9_000),
            )
            .await
            .unwrap();
        ledger
            .apply_stock_movement(
                &product.id,
                &vendor.id,
                MovementType::Out,
                1,
                MovementContext::online_order("order-9"),
            )
            .await
            .unwrap();

        let history = ledger.movement_history(&product.id, 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].reference_type, ReferenceType::OnlineOrder);
        assert_eq!(history[0].reference_id.as_deref(), Some("order-9"));
        assert_eq!(history[1].total_cost_cents, Some(36_000));
        assert_eq!(history[1].created_by.as_deref(), Some("vendor"));

        assert_eq!(ledger.movement_history(&product.id, 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_deductions_never_oversell() {
        let db = test_db().await;
        let vendor = seed_vendor(&db, "Loom", true).await;
        let product = seed_product(&db, &vendor, "SCARF-01", 20_000, 5).await;
        let ledger = StockLedger::new(db.clone());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = ledger.clone();
            let product_id = product.id.clone();
            let vendor_id = vendor.id.clone();
            handles.push(tokio::spawn(async move {
                ledger
                    .adjust_stock(&product_id, &vendor_id, MovementType::Out, 1, "Sale", None)
                    .await
            }));
        }

        let mut applied = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                applied += 1;
            }
        }

        assert_eq!(applied, 5);
        assert_eq!(db.products().stock_level(&product.id).await.unwrap(), Some(0));
        assert_eq!(ledger.movement_history(&product.id, 50).await.unwrap().len(), 5);
    }
}
