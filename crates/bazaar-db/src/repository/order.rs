//! # Order Repository
//!
//! Orders, their line items, and the guarded lifecycle updates.
//!
//! ## Edge-Guarded Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two payment callbacks arrive for the same order                        │
//! │                                                                         │
//! │  A: UPDATE orders SET is_paid = 1 ... WHERE id = ? AND is_paid = 0     │
//! │     → 1 row  → caller runs the sales recorder                          │
//! │                                                                         │
//! │  B: UPDATE orders SET is_paid = 1 ... WHERE id = ? AND is_paid = 0     │
//! │     → 0 rows → no transition, recorder not triggered                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::{Order, OrderItem, OrderStatus};

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order with its line items in line order.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT
                id, user_id, coupon_id, payment_method,
                items_price_cents, discount_cents, total_price_cents,
                status, is_paid, paid_at, is_delivered, delivered_at,
                created_at, updated_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut order) = order else {
            return Ok(None);
        };

        order.items = self.get_items(id).await?;
        Ok(Some(order))
    }

    /// Gets the line items of an order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT
                id, order_id, line_no, product_id, name_snapshot,
                quantity, unit_price_cents, unit_mrp_cents
            FROM order_items
            WHERE order_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Inserts an order and all of its lines in one transaction.
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, lines = order.items.len(), "Inserting order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, coupon_id, payment_method,
                items_price_cents, discount_cents, total_price_cents,
                status, is_paid, paid_at, is_delivered, delivered_at,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(&order.coupon_id)
        .bind(order.payment_method)
        .bind(order.items_price_cents)
        .bind(order.discount_cents)
        .bind(order.total_price_cents)
        .bind(order.status)
        .bind(order.is_paid)
        .bind(order.paid_at)
        .bind(order.is_delivered)
        .bind(order.delivered_at)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in &order.items {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, line_no, product_id, name_snapshot,
                    quantity, unit_price_cents, unit_mrp_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&order.id)
            .bind(item.line_no)
            .bind(&item.product_id)
            .bind(&item.name_snapshot)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.unit_mrp_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Flips `is_paid` false → true. Returns `false` if the order was
    /// already paid or doesn't exist.
    pub async fn mark_paid(&self, id: &str, at: DateTime<Utc>) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET is_paid = 1, paid_at = ?2, updated_at = ?2
            WHERE id = ?1 AND is_paid = 0
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Flips `is_delivered` false → true and sets status `delivered`, but
    /// only while the status is still `expected`.
    pub async fn mark_delivered(
        &self,
        id: &str,
        expected: OrderStatus,
        at: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET is_delivered = 1, delivered_at = ?3, status = 'delivered', updated_at = ?3
            WHERE id = ?1 AND is_delivered = 0 AND status = ?2
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Compare-and-set on the order status.
    pub async fn update_status(&self, id: &str, from: OrderStatus, to: OrderStatus) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE orders SET status = ?3, updated_at = ?4 WHERE id = ?1 AND status = ?2",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::*;

    #[tokio::test]
    async fn test_insert_and_load_with_items() {
        let db = test_db().await;
        let vendor = seed_vendor(&db, "Loom", false).await;
        let scarf = seed_product(&db, &vendor, "SCARF-01", 20_000, 10).await;
        let shawl = seed_product(&db, &vendor, "SHAWL-01", 5_000, 10).await;
        let order = seed_order(&db, &[(&scarf, 2), (&shawl, 5)]).await;

        let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.items.len(), 2);
        assert_eq!(loaded.items[0].product_id, scarf.id);
        assert_eq!(loaded.items[1].line_no, 2);
        assert_eq!(loaded.total_price_cents, 65_000);
        assert_eq!(loaded.status, OrderStatus::Pending);
        assert!(!loaded.is_paid);

        assert!(db.orders().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mark_paid_only_once() {
        let db = test_db().await;
        let order = seed_order(&db, &[]).await;

        assert!(db.orders().mark_paid(&order.id, Utc::now()).await.unwrap());
        assert!(!db.orders().mark_paid(&order.id, Utc::now()).await.unwrap());

        let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert!(loaded.is_paid);
        assert!(loaded.paid_at.is_some());
    }

    #[tokio::test]
    async fn test_mark_delivered_requires_expected_status() {
        let db = test_db().await;
        let order = seed_order(&db, &[]).await;

        let moved = db
            .orders()
            .mark_delivered(&order.id, OrderStatus::Shipped, Utc::now())
            .await
            .unwrap();
        assert!(!moved);

        assert!(db
            .orders()
            .mark_delivered(&order.id, OrderStatus::Pending, Utc::now())
            .await
            .unwrap());
        assert!(!db
            .orders()
            .mark_delivered(&order.id, OrderStatus::Delivered, Utc::now())
            .await
            .unwrap());

        let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Delivered);
        assert!(loaded.is_delivered);
    }

    #[tokio::test]
    async fn test_update_status_compare_and_set() {
        let db = test_db().await;
        let order = seed_order(&db, &[]).await;

        assert!(db
            .orders()
            .update_status(&order.id, OrderStatus::Pending, OrderStatus::Processing)
            .await
            .unwrap());
        assert!(!db
            .orders()
            .update_status(&order.id, OrderStatus::Pending, OrderStatus::Cancelled)
            .await
            .unwrap());
    }
}
