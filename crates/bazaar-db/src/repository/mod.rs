//! # Repository Module
//!
//! Database repository implementations for the ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories and Their Tables                        │
//! │                                                                         │
//! │  bazaar-ledger service                                                 │
//! │       │                                                                 │
//! │       │  db.sales_records().insert(&record)                            │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────┬──────────────────────────────────────┐   │
//! │  │ OrderRepository          │ orders, order_items                  │   │
//! │  │ ProductRepository        │ products (reads, inserts)            │   │
//! │  │ VendorRepository         │ vendors, stats recompute             │   │
//! │  │ SalesRecordRepository    │ sales_records, breakdown projection  │   │
//! │  │ StockMovementRepository  │ products.stock + stock_movements     │   │
//! │  │ ReconciliationRepository │ order_reconciliations (claims)       │   │
//! │  └──────────────────────────┴──────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only [`StockMovementRepository`](stock_movement::StockMovementRepository)
//! writes `products.stock`, and always together with a movement row.

pub mod order;
pub mod product;
pub mod reconciliation;
pub mod sales_record;
pub mod stock_movement;
pub mod vendor;

/// Generates a new entity ID.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
