//! # bazaar-ledger: Order-to-Vendor-Sales Reconciliation
//!
//! Services that run when an order is paid or delivered: one sales record
//! per order line, platform commission and vendor net, and optional stock
//! deduction with an audit trail.
//!
//! ## Service Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  OrderFlow                                                              │
//! │   confirm_payment / confirm_delivery / cancel / override_status         │
//! │        │ paid or delivered edge                                         │
//! │        ▼                                                                │
//! │  SalesRecorder ─── claim + per-line records ──► sales_records           │
//! │        │                                                                │
//! │        ├──► StockLedger (vendor.auto_stock_deduction)                   │
//! │        │       conditional UPDATE + movement ──► products, movements    │
//! │        │                                                                │
//! │        └──► VendorStats::recompute (once per vendor)                    │
//! │                                                                         │
//! │  sales_breakdown(order) ── read projection ◄── sales_records            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use bazaar_db::{Database, DbConfig};
//! use bazaar_ledger::{LedgerConfig, SalesRecorder};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = LedgerConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//! let recorder = SalesRecorder::new(db.clone(), config.commission_rate())
//!     .with_claim_lease(config.claim_lease());
//!
//! match recorder.record_sales_for_order("order-id").await {
//!     Ok(outcome) if !outcome.is_complete() => println!("partial: {:?}", outcome.skipped_lines),
//!     Ok(_) => {}
//!     Err(err) if err.is_already_recorded() => {}
//!     Err(err) => return Err(err.into()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod breakdown;
pub mod config;
pub mod error;
pub mod order_flow;
pub mod recorder;
pub mod stats;
pub mod stock_ledger;
pub mod telemetry;

pub use breakdown::sales_breakdown;
pub use config::LedgerConfig;
pub use error::{ConfigError, LedgerError, LedgerResult};
pub use order_flow::{OrderFlow, Transition};
pub use recorder::{OfflineSale, RecordedSales, SalesRecorder, SkippedLine};
pub use stats::{SqliteVendorStats, VendorStats};
pub use stock_ledger::{MovementContext, StockLedger};

#[cfg(test)]
pub(crate) mod test_support {
    use bazaar_core::{CommissionRate, Order, PaymentMethod, Product, Vendor};
    use bazaar_db::{Database, DbConfig};

    use crate::recorder::SalesRecorder;

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn recorder(db: &Database) -> SalesRecorder {
        SalesRecorder::new(db.clone(), CommissionRate::PLATFORM_DEFAULT)
    }

    pub async fn seed_vendor(db: &Database, name: &str, auto_stock: bool) -> Vendor {
        let mut vendor = Vendor::new(name, format!("{}@example.com", name.to_lowercase()));
        vendor.auto_stock_deduction = auto_stock;
        db.vendors().insert(&vendor).await.unwrap();
        vendor
    }

    pub async fn seed_product(db: &Database, vendor: &Vendor, sku: &str, price: i64, stock: i64) -> Product {
        let mut product = Product::new(&vendor.id, sku, format!("Product {sku}"), price);
        product.stock = stock;
        db.products().insert(&product).await.unwrap();
        product
    }

    /// Inserts an unpaid order; products need not exist in the store.
    pub async fn seed_order(db: &Database, lines: &[(&Product, i64)]) -> Order {
        let mut order = Order::new("customer-1", PaymentMethod::Card);
        for (product, qty) in lines {
            order.push_item(&product.id, &product.name, *qty, product.price_cents);
        }
        db.orders().insert(&order).await.unwrap();
        order
    }
}
