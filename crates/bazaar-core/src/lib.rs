//! # bazaar-core: Pure Business Logic for the Bazaar Marketplace Ledger
//!
//! This crate holds the rules behind order-to-vendor-sales reconciliation
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Bazaar Ledger Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │         Storefront / Vendor Dashboard / Admin Panel             │   │
//! │  │    checkout ──► payment ──► delivery ──► sales reports          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ in-process calls                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    bazaar-ledger (services)                     │   │
//! │  │    SalesRecorder, StockLedger, OrderFlow, sales_breakdown       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bazaar-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   stock   │  │ validation│  │   │
//! │  │   │  Order    │  │   Money   │  │ delta +   │  │   rules   │  │   │
//! │  │   │  Vendor   │  │ Commission│  │ invariant │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    bazaar-db (Database Layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, Product, Vendor, SalesRecord, StockMovement)
//! - [`money`] - Money type and commission rate, integer arithmetic only
//! - [`commission`] - Sale amount / platform commission / net payout split
//! - [`stock`] - Movement sign table and the stock-change invariant
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use bazaar_core::commission::SaleAmounts;
//! use bazaar_core::money::{CommissionRate, Money};
//!
//! let amounts = SaleAmounts::compute(Money::from_cents(10_000), 3, CommissionRate::PLATFORM_DEFAULT);
//!
//! assert_eq!(amounts.sale_amount.cents(), 30_000);
//! assert_eq!(amounts.platform_commission.cents(), 1_500);
//! assert_eq!(amounts.net_amount.cents(), 28_500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod commission;
pub mod error;
pub mod money;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use commission::SaleAmounts;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{CommissionRate, Money};
pub use stock::StockChange;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Platform commission retained from every sale, in basis points (5%).
pub const COMMISSION_RATE_BPS: u32 = 500;

/// Maximum quantity accepted on a single order line or offline sale.
///
/// Guards against fat-finger entries (typing 10000 instead of 100).
pub const MAX_LINE_QUANTITY: i64 = 9_999;

/// Largest magnitude a single stock movement may carry (restocks included).
pub const MAX_MOVEMENT_QUANTITY: i64 = 1_000_000;
