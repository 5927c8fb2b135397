//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  Ledger startup (LedgerConfig → DbConfig)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.orders() / db.products() / db.sales_records() / ...                │
//! │  (each repository holds a cheap clone of the pool)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! Readers don't block writers and writers don't block readers. Stock
//! updates are single conditional statements, so concurrent deductions
//! serialize inside SQLite rather than in application code.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::order::OrderRepository;
use crate::repository::product::ProductRepository;
use crate::repository::reconciliation::ReconciliationRepository;
use crate::repository::sales_record::SalesRecordRepository;
use crate::repository::stock_movement::StockMovementRepository;
use crate::repository::vendor::VendorRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Pool settings. Built from `LedgerConfig::db_config` in the binaries and
/// from [`DbConfig::in_memory`] in tests.
///
/// ```rust,ignore
/// let config = DbConfig::new("./bazaar.db").max_connections(8);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,
    /// Default 5.
    pub max_connections: u32,
    /// Default 1.
    pub min_connections: u32,
    /// How long `acquire` waits for a free connection.
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    /// How long a writer waits on a locked database before `SQLITE_BUSY`.
    /// Concurrent recorders and stock deductions contend here.
    pub busy_timeout: Duration,
    pub run_migrations: bool,
}

impl DbConfig {
    /// File-backed database, created on first connect.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Leaves the schema alone (e.g. a read-only reporting replica).
    pub fn skip_migrations(mut self) -> Self {
        self.run_migrations = false;
        self
    }

    /// Private in-memory database with migrations applied.
    ///
    /// Exactly one connection: a second one would open a different
    /// database. Never hold a transaction open while calling another
    /// repository on the same handle.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            busy_timeout: Duration::from_secs(1),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// Cloning is cheap; every clone shares the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Creates the connection pool and (optionally) runs migrations.
    ///
    /// SQLite is configured with WAL journaling, NORMAL synchronous and
    /// foreign keys enabled.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // SQLite has them disabled by default
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies all pending migrations.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn vendors(&self) -> VendorRepository {
        VendorRepository::new(self.pool.clone())
    }

    pub fn sales_records(&self) -> SalesRecordRepository {
        SalesRecordRepository::new(self.pool.clone())
    }

    /// Stock levels and their movement log.
    pub fn stock_movements(&self) -> StockMovementRepository {
        StockMovementRepository::new(self.pool.clone())
    }

    /// Per-order reconciliation claims.
    pub fn reconciliations(&self) -> ReconciliationRepository {
        ReconciliationRepository::new(self.pool.clone())
    }

    /// Closes the pool. Repository calls fail afterwards.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is responsive.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
