//! # Stock Movement Repository
//!
//! The only writer of `products.stock`. Every level change and its movement
//! row commit together.
//!
//! ## Atomic Conditional Update
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │                                                                         │
//! │  UPDATE products                                                       │
//! │     SET stock = stock + :delta                                         │
//! │   WHERE id = :product                                                  │
//! │     AND (:delta >= 0 OR stock + :delta >= 0)                           │
//! │  RETURNING stock                                                       │
//! │       │                                                                 │
//! │       ├── row    → StockChange::from_new_level, INSERT stock_movements │
//! │       │            COMMIT → StockUpdate::Applied                       │
//! │       │                                                                 │
//! │       └── no row → product missing or not enough stock                 │
//! │                    ROLLBACK → StockUpdate::ProductMissing/Insufficient │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two concurrent deductions can never both pass the guard against the
//! same units: SQLite serializes the UPDATEs and each sees the other's
//! committed level.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use bazaar_core::{ApprovalStatus, MovementType, ReferenceType, StockChange, StockMovement};

/// Input for a stock change. `delta` is already signed.
#[derive(Debug, Clone)]
pub struct NewStockMovement {
    pub vendor_id: String,
    pub product_id: String,
    pub movement_type: MovementType,
    pub delta: i64,
    pub reference_type: ReferenceType,
    pub reference_id: Option<String>,
    pub reason: String,
    pub unit_cost_cents: Option<i64>,
    pub created_by: Option<String>,
}

/// Result of [`StockMovementRepository::apply`].
#[derive(Debug, Clone)]
pub enum StockUpdate {
    /// Level changed; the recorded movement is returned.
    Applied(StockMovement),
    /// Deduction refused; `current` is the level that was read.
    Insufficient { current: i64 },
    ProductMissing,
}

const MOVEMENT_COLUMNS: &str = r#"
    id, vendor_id, product_id, movement_type, quantity, previous_stock, new_stock,
    reference_type, reference_id, reason, unit_cost_cents, total_cost_cents,
    approval_status, created_by, created_at
"#;

#[derive(Debug, Clone)]
pub struct StockMovementRepository {
    pool: SqlitePool,
}

impl StockMovementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StockMovementRepository { pool }
    }

    /// Applies a signed delta and appends the movement, atomically.
    pub async fn apply(&self, input: &NewStockMovement) -> DbResult<StockUpdate> {
        debug!(
            product_id = %input.product_id,
            movement_type = %input.movement_type,
            delta = input.delta,
            "Applying stock movement"
        );

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let new_stock: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET stock = stock + ?2, updated_at = ?3
            WHERE id = ?1 AND (?2 >= 0 OR stock + ?2 >= 0)
            RETURNING stock
            "#,
        )
        .bind(&input.product_id)
        .bind(input.delta)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(new_stock) = new_stock else {
            let current: Option<i64> =
                sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
                    .bind(&input.product_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            tx.rollback().await?;

            return Ok(match current {
                Some(current) => {
                    warn!(
                        product_id = %input.product_id,
                        current,
                        delta = input.delta,
                        "Stock change refused: would go negative"
                    );
                    StockUpdate::Insufficient { current }
                }
                None => StockUpdate::ProductMissing,
            });
        };

        let change = StockChange::from_new_level(new_stock, input.delta);
        let total_cost = match input.unit_cost_cents {
            Some(cost) => input
                .delta
                .checked_abs()
                .and_then(|qty| cost.checked_mul(qty))
                .map(Some),
            None => Some(None),
        };
        let (Some(change), Some(total_cost_cents)) = (change, total_cost) else {
            tx.rollback().await?;
            return Err(DbError::CheckViolation {
                message: format!(
                    "stock movement for {} out of range (level {new_stock}, delta {})",
                    input.product_id, input.delta
                ),
            });
        };

        let movement = StockMovement {
            id: generate_id(),
            vendor_id: input.vendor_id.clone(),
            product_id: input.product_id.clone(),
            movement_type: input.movement_type,
            quantity: change.delta,
            previous_stock: change.previous,
            new_stock: change.new,
            reference_type: input.reference_type,
            reference_id: input.reference_id.clone(),
            reason: input.reason.clone(),
            unit_cost_cents: input.unit_cost_cents,
            total_cost_cents,
            approval_status: ApprovalStatus::Approved,
            created_by: input.created_by.clone(),
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                id, vendor_id, product_id, movement_type, quantity, previous_stock, new_stock,
                reference_type, reference_id, reason, unit_cost_cents, total_cost_cents,
                approval_status, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.vendor_id)
        .bind(&movement.product_id)
        .bind(movement.movement_type)
        .bind(movement.quantity)
        .bind(movement.previous_stock)
        .bind(movement.new_stock)
        .bind(movement.reference_type)
        .bind(&movement.reference_id)
        .bind(&movement.reason)
        .bind(movement.unit_cost_cents)
        .bind(movement.total_cost_cents)
        .bind(movement.approval_status)
        .bind(&movement.created_by)
        .bind(movement.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            product_id = %movement.product_id,
            previous = movement.previous_stock,
            new = movement.new_stock,
            "Stock movement recorded"
        );
        Ok(StockUpdate::Applied(movement))
    }

    /// Movements of a product, newest first.
    pub async fn list_for_product(&self, product_id: &str, limit: u32) -> DbResult<Vec<StockMovement>> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE product_id = ?1 ORDER BY rowid DESC LIMIT ?2"
        );
        let movements = sqlx::query_as::<_, StockMovement>(&sql)
            .bind(product_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(movements)
    }

    /// Movements caused by one reference (e.g. all deductions of an order).
    pub async fn list_for_reference(
        &self,
        reference_type: ReferenceType,
        reference_id: &str,
    ) -> DbResult<Vec<StockMovement>> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE reference_type = ?1 AND reference_id = ?2 ORDER BY rowid"
        );
        let movements = sqlx::query_as::<_, StockMovement>(&sql)
            .bind(reference_type)
            .bind(reference_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(movements)
    }
}
