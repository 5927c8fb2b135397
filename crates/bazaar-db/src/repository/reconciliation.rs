//! # Reconciliation Repository
//!
//! Per-order claim rows that make sales recording at-most-once.
//!
//! ## Claim Lifecycle
//! ```text
//!             try_claim (INSERT ... ON CONFLICT DO NOTHING)
//!                     │
//!                     ▼
//!               in_progress ──finish──► completed   (terminal)
//!                │    ▲
//!                │    └──reopen── partial ◄──finish──┘
//!                │
//!                └──reopen (started_at < stale_before)──► in_progress
//! ```
//!
//! Only one caller can win the insert for a given order, and only one can
//! win a reopen. A pass that never reached `finish` (crash, cancelled task,
//! failed final update) holds its claim until `stale_before` passes its
//! `started_at`; the reopen restarts that clock.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::{OrderReconciliation, ReconciliationStatus};

#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    pool: SqlitePool,
}

impl ReconciliationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReconciliationRepository { pool }
    }

    /// Claims the order for recording. Returns `false` if a claim exists.
    pub async fn try_claim(&self, order_id: &str, line_count: i64, at: DateTime<Utc>) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO order_reconciliations (order_id, status, line_count, recorded_count, started_at)
            VALUES (?1, ?2, ?3, 0, ?4)
            ON CONFLICT(order_id) DO NOTHING
            "#,
        )
        .bind(order_id)
        .bind(ReconciliationStatus::InProgress)
        .bind(line_count)
        .bind(at)
        .execute(&self.pool)
        .await?;

        let claimed = result.rows_affected() == 1;
        debug!(order_id = %order_id, claimed, "Reconciliation claim attempted");
        Ok(claimed)
    }

    pub async fn get(&self, order_id: &str) -> DbResult<Option<OrderReconciliation>> {
        let claim = sqlx::query_as::<_, OrderReconciliation>(
            r#"
            SELECT order_id, status, line_count, recorded_count, started_at, finished_at
            FROM order_reconciliations
            WHERE order_id = ?1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(claim)
    }

    /// Records the outcome of a recording pass.
    pub async fn finish(
        &self,
        order_id: &str,
        status: ReconciliationStatus,
        recorded_count: i64,
        at: DateTime<Utc>,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE order_reconciliations
            SET status = ?2, recorded_count = ?3, finished_at = ?4
            WHERE order_id = ?1
            "#,
        )
        .bind(order_id)
        .bind(status)
        .bind(recorded_count)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Hands the claim to a new pass: a `partial` claim, or an
    /// `in_progress` one started before `stale_before`. Returns `false` if
    /// neither applies (or another caller reopened it first).
    pub async fn reopen(
        &self,
        order_id: &str,
        stale_before: DateTime<Utc>,
        at: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE order_reconciliations
            SET status = ?2, started_at = ?5, finished_at = NULL
            WHERE order_id = ?1
              AND (status = ?3 OR (status = ?2 AND started_at < ?4))
            "#,
        )
        .bind(order_id)
        .bind(ReconciliationStatus::InProgress)
        .bind(ReconciliationStatus::Partial)
        .bind(stale_before)
        .bind(at)
        .execute(&self.pool)
        .await?;

        let reopened = result.rows_affected() == 1;
        debug!(order_id = %order_id, reopened, "Reconciliation reopen attempted");
        Ok(reopened)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_claim_is_exclusive() {
        let db = test_db().await;
        let repo = db.reconciliations();

        assert!(repo.try_claim("order-1", 2, Utc::now()).await.unwrap());
        assert!(!repo.try_claim("order-1", 2, Utc::now()).await.unwrap());
        assert!(repo.try_claim("order-2", 1, Utc::now()).await.unwrap());

        let claim = repo.get("order-1").await.unwrap().unwrap();
        assert_eq!(claim.status, ReconciliationStatus::InProgress);
        assert_eq!(claim.line_count, 2);
        assert!(claim.finished_at.is_none());
    }

    #[tokio::test]
    async fn test_finish_and_reopen() {
        let db = test_db().await;
        let repo = db.reconciliations();
        let started = Utc::now();
        repo.try_claim("order-1", 2, started).await.unwrap();

        // A live pass keeps its claim.
        assert!(!repo.reopen("order-1", started - Duration::minutes(5), Utc::now()).await.unwrap());

        repo.finish("order-1", ReconciliationStatus::Partial, 1, Utc::now())
            .await
            .unwrap();
        let claim = repo.get("order-1").await.unwrap().unwrap();
        assert_eq!(claim.status, ReconciliationStatus::Partial);
        assert_eq!(claim.recorded_count, 1);

        assert!(repo.reopen("order-1", started, Utc::now()).await.unwrap());
        assert!(!repo.reopen("order-1", started, Utc::now()).await.unwrap());

        repo.finish("order-1", ReconciliationStatus::Completed, 2, Utc::now())
            .await
            .unwrap();
        assert!(!repo.reopen("order-1", Utc::now() + Duration::days(1), Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_abandoned_claim_reopens_after_lease() {
        let db = test_db().await;
        let repo = db.reconciliations();
        let started = Utc::now() - Duration::minutes(10);
        repo.try_claim("order-1", 3, started).await.unwrap();

        let lease_cutoff = Utc::now() - Duration::minutes(5);
        assert!(repo.reopen("order-1", lease_cutoff, Utc::now()).await.unwrap());

        // The reopen restarted the lease, so a second taker has to wait.
        assert!(!repo.reopen("order-1", lease_cutoff, Utc::now()).await.unwrap());

        let claim = repo.get("order-1").await.unwrap().unwrap();
        assert_eq!(claim.status, ReconciliationStatus::InProgress);
        assert!(claim.started_at > started);
    }

    #[tokio::test]
    async fn test_missing_claim() {
        let db = test_db().await;
        assert!(db.reconciliations().get("nope").await.unwrap().is_none());
    }
}
