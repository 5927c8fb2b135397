//! # Validation Module
//!
//! Input checks applied before the ledger writes anything.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Ledger service (Rust)                                        │
//! │  └── THIS MODULE: quantities, prices, reasons, rates                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── CHECK (new_stock >= 0), CHECK (stock >= 0)                        │
//! │  ├── UNIQUE (order_item_id)                                            │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bazaar_core::validation::{validate_quantity, validate_reason};
//!
//! validate_quantity(5).unwrap();
//! validate_reason("Damaged in transit").unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::CommissionRate;
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest free-text reason stored on a stock movement.
pub const MAX_REASON_LEN: usize = 500;

// =============================================================================
// Text Validators
// =============================================================================

/// Validates the free-text reason of a stock movement.
///
/// ## Returns
/// The trimmed reason.
pub fn validate_reason(reason: &str) -> ValidationResult<String> {
    let reason = reason.trim();

    if reason.is_empty() {
        return Err(ValidationError::Required {
            field: "reason".to_string(),
        });
    }

    if reason.chars().count() > MAX_REASON_LEN {
        return Err(ValidationError::TooLong {
            field: "reason".to_string(),
            max: MAX_REASON_LEN,
        });
    }

    Ok(reason.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sold quantity (order line or offline sale).
///
/// ```text
/// qty <= 0      → MustBePositive
/// qty > 9999    → OutOfRange
/// otherwise     → Ok
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in minor units. Zero is allowed (free items).
///
/// ## Example
/// ```rust
/// use bazaar_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(3333).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a commission rate in basis points (0% to 100%).
pub fn validate_commission_bps(bps: i64) -> ValidationResult<CommissionRate> {
    if !(0..=CommissionRate::MAX_BPS as i64).contains(&bps) {
        return Err(ValidationError::OutOfRange {
            field: "commission_bps".to_string(),
            min: 0,
            max: CommissionRate::MAX_BPS as i64,
        });
    }

    Ok(CommissionRate::from_bps(bps as u32))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_reason() {
        assert_eq!(validate_reason("  Stocktake  ").unwrap(), "Stocktake");
        assert!(matches!(
            validate_reason("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_reason(&"x".repeat(MAX_REASON_LEN + 1)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_validate_commission_bps() {
        assert_eq!(validate_commission_bps(500).unwrap().bps(), 500);
        assert!(validate_commission_bps(0).is_ok());
        assert!(validate_commission_bps(10_000).is_ok());
        assert!(validate_commission_bps(10_001).is_err());
        assert!(validate_commission_bps(-1).is_err());
    }
}
