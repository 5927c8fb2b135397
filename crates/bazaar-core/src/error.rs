//! # Error Types
//!
//! Domain-specific error types for bazaar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bazaar-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bazaar-db errors                                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  bazaar-ledger errors                                                  │
//! │  └── LedgerError      - What reconciliation callers see                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → LedgerError ← DbError             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A stock change would leave the product below zero, or its
    /// before/after levels do not agree with the delta.
    ///
    /// ## When This Occurs
    /// ```text
    /// Online order: qty 5
    ///      │
    ///      ▼
    /// stock = 3, delta = -5
    ///      │
    ///      ▼
    /// InvalidStockState { product_id, previous: 3, delta: -5 }
    ///      │
    ///      ▼
    /// Sale is still recorded, stock left untouched
    /// ```
    #[error("Invalid stock state for {product_id}: stock {previous}, change {delta}")]
    InvalidStockState {
        product_id: String,
        previous: i64,
        delta: i64,
    },

    /// Movement quantity is zero, or its sign does not fit the movement type.
    #[error("Invalid quantity {quantity} for {movement} movement")]
    InvalidQuantity { movement: String, quantity: i64 },

    /// Order status change not permitted by the lifecycle.
    #[error("Order cannot move from {from:?} to {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
