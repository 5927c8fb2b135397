//! # Order Transitions
//!
//! Payment, delivery, cancellation and admin overrides, with the sales
//! recorder hooked onto the paid and delivered edges.
//!
//! ## Lifecycle
//! ```text
//!   pending ──► processing ──► shipped ──► delivered
//!      │            │
//!      └────────────┴──────► cancelled
//!
//!   paid edge       UPDATE ... WHERE is_paid = 0       ──► record sales
//!   delivered edge  UPDATE ... WHERE is_delivered = 0  ──► record sales
//! ```
//!
//! Both edges call the same recorder, whose claim keeps the order from being
//! recorded twice. A recording failure is logged; the transition itself has
//! already committed and is reported as successful.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info};

use bazaar_core::{CoreError, Order, OrderStatus};
use bazaar_db::Database;

use crate::error::{LedgerError, LedgerResult};
use crate::recorder::{RecordedSales, SalesRecorder};

/// Result of one transition request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub order_id: String,
    pub from: OrderStatus,
    pub to: OrderStatus,
    /// `false` when the edge had already fired (or another caller won).
    pub changed: bool,
    /// Present when this transition ran the recorder successfully.
    pub recorded: Option<RecordedSales>,
}

impl Transition {
    fn unchanged(order: &Order) -> Self {
        Transition {
            order_id: order.id.clone(),
            from: order.status,
            to: order.status,
            changed: false,
            recorded: None,
        }
    }
}

#[derive(Clone)]
pub struct OrderFlow {
    db: Database,
    recorder: SalesRecorder,
}

impl OrderFlow {
    pub fn new(db: Database, recorder: SalesRecorder) -> Self {
        OrderFlow { db, recorder }
    }

    async fn load(&self, order_id: &str) -> LedgerResult<Order> {
        self.db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| LedgerError::OrderNotFound(order_id.to_string()))
    }

    /// Marks the order paid; a pending order moves to processing.
    pub async fn confirm_payment(&self, order_id: &str) -> LedgerResult<Transition> {
        let order = self.load(order_id).await?;
        if order.status == OrderStatus::Cancelled {
            return Err(CoreError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Processing,
            }
            .into());
        }

        if !self.db.orders().mark_paid(order_id, Utc::now()).await? {
            debug!(order_id = %order_id, "Order already paid");
            return Ok(Transition::unchanged(&order));
        }

        let mut to = order.status;
        if order.status == OrderStatus::Pending
            && self
                .db
                .orders()
                .update_status(order_id, OrderStatus::Pending, OrderStatus::Processing)
                .await?
        {
            to = OrderStatus::Processing;
        }

        info!(order_id = %order_id, from = ?order.status, to = ?to, "Payment confirmed");

        Ok(Transition {
            order_id: order.id.clone(),
            from: order.status,
            to,
            changed: true,
            recorded: self.record(order_id).await,
        })
    }

    /// Marks the order delivered from any non-terminal status.
    pub async fn confirm_delivery(&self, order_id: &str) -> LedgerResult<Transition> {
        let order = self.load(order_id).await?;
        if order.is_delivered {
            debug!(order_id = %order_id, "Order already delivered");
            return Ok(Transition::unchanged(&order));
        }
        order.status.check_override(OrderStatus::Delivered)?;

        let delivered = self
            .db
            .orders()
            .mark_delivered(order_id, order.status, Utc::now())
            .await?;
        if !delivered {
            debug!(order_id = %order_id, "Order changed concurrently; delivery not applied");
            return Ok(Transition::unchanged(&order));
        }

        info!(order_id = %order_id, from = ?order.status, "Delivery confirmed");

        Ok(Transition {
            order_id: order.id.clone(),
            from: order.status,
            to: OrderStatus::Delivered,
            changed: true,
            recorded: self.record(order_id).await,
        })
    }

    pub async fn cancel(&self, order_id: &str) -> LedgerResult<Transition> {
        let order = self.load(order_id).await?;
        if !order.status.can_transition_to(OrderStatus::Cancelled) {
            return Err(CoreError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Cancelled,
            }
            .into());
        }

        self.set_status(&order, OrderStatus::Cancelled).await
    }

    /// Admin status override. Delivered goes through the delivery edge so
    /// the recorder still fires.
    pub async fn override_status(&self, order_id: &str, next: OrderStatus) -> LedgerResult<Transition> {
        let order = self.load(order_id).await?;
        order.status.check_override(next)?;

        if next == OrderStatus::Delivered {
            return self.confirm_delivery(order_id).await;
        }

        self.set_status(&order, next).await
    }

    async fn set_status(&self, order: &Order, next: OrderStatus) -> LedgerResult<Transition> {
        let changed = self
            .db
            .orders()
            .update_status(&order.id, order.status, next)
            .await?;
        if changed {
            info!(order_id = %order.id, from = ?order.status, to = ?next, "Order status changed");
        }

        Ok(Transition {
            order_id: order.id.clone(),
            from: order.status,
            to: if changed { next } else { order.status },
            changed,
            recorded: None,
        })
    }

    async fn record(&self, order_id: &str) -> Option<RecordedSales> {
        match self.recorder.record_sales_for_order(order_id).await {
            Ok(recorded) => Some(recorded),
            Err(err) if err.is_already_recorded() => {
                debug!(order_id = %order_id, "Sales already recorded, nothing to do");
                None
            }
            Err(err) => {
                error!(order_id = %order_id, error = %err, "Sales recording failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    fn flow(db: &Database) -> OrderFlow {
        OrderFlow::new(db.clone(), recorder(db))
    }

    #[tokio::test]
    async fn test_payment_edge_records_once() {
        let db = test_db().await;
        let loom = seed_vendor(&db, "Loom", false).await;
        let scarf = seed_product(&db, &loom, "SCARF-01", 10_000, 10).await;
        let order = seed_order(&db, &[(&scarf, 1)]).await;
        let flow = flow(&db);

        let paid = flow.confirm_payment(&order.id).await.unwrap();
        assert!(paid.changed);
        assert_eq!(paid.from, OrderStatus::Pending);
        assert_eq!(paid.to, OrderStatus::Processing);
        assert_eq!(paid.recorded.unwrap().created_records.len(), 1);

        let again = flow.confirm_payment(&order.id).await.unwrap();
        assert!(!again.changed);
        assert!(again.recorded.is_none());

        let stored = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert!(stored.is_paid);
        assert!(stored.paid_at.is_some());
        assert_eq!(stored.status, OrderStatus::Processing);
        assert_eq!(db.sales_records().list_for_order(&order.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_payment_then_delivery_records_once() {
        let db = test_db().await;
        let loom = seed_vendor(&db, "Loom", true).await;
        let scarf = seed_product(&db, &loom, "SCARF-01", 10_000, 10).await;
        let order = seed_order(&db, &[(&scarf, 4)]).await;
        let flow = flow(&db);

        flow.confirm_payment(&order.id).await.unwrap();
        let delivered = flow.confirm_delivery(&order.id).await.unwrap();
        assert!(delivered.changed);
        assert_eq!(delivered.to, OrderStatus::Delivered);
        assert!(delivered.recorded.is_none());

        let stored = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert!(stored.is_delivered);
        assert_eq!(stored.status, OrderStatus::Delivered);
        assert_eq!(db.sales_records().list_for_order(&order.id).await.unwrap().len(), 1);
        assert_eq!(db.products().stock_level(&scarf.id).await.unwrap(), Some(6));

        let again = flow.confirm_delivery(&order.id).await.unwrap();
        assert!(!again.changed);
    }

    #[tokio::test]
    async fn test_delivery_without_payment_records() {
        let db = test_db().await;
        let loom = seed_vendor(&db, "Loom", false).await;
        let scarf = seed_product(&db, &loom, "SCARF-01", 10_000, 10).await;
        let order = seed_order(&db, &[(&scarf, 1)]).await;

        let delivered = flow(&db).confirm_delivery(&order.id).await.unwrap();
        assert!(delivered.changed);
        assert_eq!(delivered.from, OrderStatus::Pending);
        assert!(delivered.recorded.unwrap().is_complete());
    }

    #[tokio::test]
    async fn test_recording_failure_does_not_fail_transition() {
        let db = test_db().await;
        let loom = seed_vendor(&db, "Loom", false).await;
        let scarf = seed_product(&db, &loom, "SCARF-01", 10_000, 10).await;
        let order = seed_order(&db, &[(&scarf, 1)]).await;

        // Recorder bound to another store cannot find the order.
        let elsewhere = test_db().await;
        let flow = OrderFlow::new(db.clone(), recorder(&elsewhere));

        let paid = flow.confirm_payment(&order.id).await.unwrap();
        assert!(paid.changed);
        assert!(paid.recorded.is_none());
        assert!(db.orders().get_by_id(&order.id).await.unwrap().unwrap().is_paid);
    }

    #[tokio::test]
    async fn test_cancel_rules() {
        let db = test_db().await;
        let loom = seed_vendor(&db, "Loom", false).await;
        let scarf = seed_product(&db, &loom, "SCARF-01", 10_000, 10).await;
        let pending = seed_order(&db, &[(&scarf, 1)]).await;
        let shipped = seed_order(&db, &[(&scarf, 1)]).await;
        let flow = flow(&db);

        let cancelled = flow.cancel(&pending.id).await.unwrap();
        assert!(cancelled.changed);
        assert_eq!(cancelled.to, OrderStatus::Cancelled);

        let err = flow.confirm_payment(&pending.id).await.unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::InvalidTransition { .. })));

        flow.override_status(&shipped.id, OrderStatus::Shipped).await.unwrap();
        let err = flow.cancel(&shipped.id).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::InvalidTransition {
                from: OrderStatus::Shipped,
                to: OrderStatus::Cancelled
            })
        ));
    }

    #[tokio::test]
    async fn test_override_to_delivered_uses_delivery_edge() {
        let db = test_db().await;
        let loom = seed_vendor(&db, "Loom", false).await;
        let scarf = seed_product(&db, &loom, "SCARF-01", 10_000, 10).await;
        let order = seed_order(&db, &[(&scarf, 2)]).await;
        let flow = flow(&db);

        let shipped = flow.override_status(&order.id, OrderStatus::Shipped).await.unwrap();
        assert_eq!(shipped.to, OrderStatus::Shipped);
        assert!(shipped.recorded.is_none());

        let delivered = flow.override_status(&order.id, OrderStatus::Delivered).await.unwrap();
        assert!(delivered.changed);
        assert_eq!(delivered.recorded.unwrap().created_records.len(), 1);

        let err = flow
            .override_status(&order.id, OrderStatus::Processing)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let db = test_db().await;
        let err = flow(&db).confirm_payment("missing").await.unwrap_err();
        assert!(matches!(err, LedgerError::OrderNotFound(_)));
    }
}
