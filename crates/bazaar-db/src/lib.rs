//! # bazaar-db: Database Layer for the Bazaar Ledger
//!
//! SQLite storage for orders, catalogue, sales records, stock movements and
//! reconciliation claims, using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Ledger Data Flow                          │
//! │                                                                         │
//! │  SalesRecorder / StockLedger / OrderFlow (bazaar-ledger)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bazaar-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌──────────────────┐   ┌─────────────┐  │   │
//! │  │   │   Database    │    │  Repositories    │   │ Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                  │   │ (embedded)  │  │   │
//! │  │   │               │    │ OrderRepo        │   │             │  │   │
//! │  │   │ SqlitePool    │◄───│ SalesRecordRepo  │   │ 0001_init   │  │   │
//! │  │   │               │    │ StockMovementRepo│   │             │  │   │
//! │  │   └───────────────┘    └──────────────────┘   └─────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (BAZAAR_DB_PATH)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bazaar_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./bazaar.db")).await?;
//! let order = db.orders().get_by_id("order-uuid").await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::reconciliation::ReconciliationRepository;
pub use repository::sales_record::SalesRecordRepository;
pub use repository::stock_movement::{NewStockMovement, StockMovementRepository, StockUpdate};
pub use repository::vendor::VendorRepository;
