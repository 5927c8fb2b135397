//! # Ledger Error Types
//!
//! What callers of the reconciliation services see.
//!
//! ## Which Errors Escape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_sales_for_order                                                 │
//! │                                                                         │
//! │  order-level                          line-level (logged, skipped)      │
//! │  ───────────                          ────────────────────────────      │
//! │  AlreadyRecorded  (no-op for caller)  ProductNotFound                   │
//! │  OrderNotFound                        VendorNotFound                    │
//! │  Store (order / claim read failed)    InvalidStockState (stock kept)    │
//! │                                       Store (record insert failed)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use bazaar_core::{CoreError, ValidationError};
use bazaar_db::DbError;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Sales already exist (or are being written) for this order.
    #[error("Sales already recorded for order {order_id}")]
    AlreadyRecorded { order_id: String },

    /// Resume requested for an order whose claim isn't partial.
    #[error("Order {order_id} cannot be resumed: {reason}")]
    NotResumable { order_id: String, reason: String },

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Vendor not found: {0}")]
    VendorNotFound(String),

    /// Product is owned by a different vendor than the caller claimed.
    #[error("Product {product_id} belongs to vendor {owner}, not {vendor_id}")]
    VendorMismatch {
        product_id: String,
        vendor_id: String,
        owner: String,
    },

    /// The movement would drive stock below zero.
    #[error("Insufficient stock for {product_id}: stock {current}, change {delta}")]
    InvalidStockState {
        product_id: String,
        current: i64,
        delta: i64,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Store error: {0}")]
    Store(#[from] DbError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl LedgerError {
    /// The duplicate-recording guard fired; callers treat it as success.
    pub fn is_already_recorded(&self) -> bool {
        matches!(self, LedgerError::AlreadyRecorded { .. })
    }
}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        LedgerError::Core(CoreError::Validation(err))
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_recorded_is_a_no_op_signal() {
        let err = LedgerError::AlreadyRecorded {
            order_id: "o-1".to_string(),
        };
        assert!(err.is_already_recorded());
        assert_eq!(err.to_string(), "Sales already recorded for order o-1");

        assert!(!LedgerError::OrderNotFound("o-1".to_string()).is_already_recorded());
    }

    #[test]
    fn test_conversions() {
        let err: LedgerError = DbError::not_found("Order", "o-1").into();
        assert!(matches!(err, LedgerError::Store(DbError::NotFound { .. })));

        let err: LedgerError = ValidationError::Required {
            field: "reason".to_string(),
        }
        .into();
        assert!(matches!(err, LedgerError::Core(CoreError::Validation(_))));

        let err: LedgerError = ConfigError::InvalidValue("BAZAAR_COMMISSION_BPS".to_string()).into();
        assert_eq!(err.to_string(), "Invalid value for BAZAAR_COMMISSION_BPS");
    }
}
