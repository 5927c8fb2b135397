//! # Stock Rules
//!
//! Sign table for movement types and the before/after invariant every
//! stock movement must satisfy.
//!
//! ```text
//! ┌──────────────┬───────────┬──────────────────────────────┐
//! │ movement     │ direction │ stored quantity              │
//! ├──────────────┼───────────┼──────────────────────────────┤
//! │ in           │ inbound   │ +qty                         │
//! │ return       │ inbound   │ +qty                         │
//! │ out          │ outbound  │ -qty                         │
//! │ damage       │ outbound  │ -qty                         │
//! │ transfer     │ outbound  │ -qty                         │
//! │ adjustment   │ signed    │ as given by the caller       │
//! └──────────────┴───────────┴──────────────────────────────┘
//!
//! new_stock = previous_stock + quantity, and new_stock >= 0
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::MovementType;
use crate::MAX_MOVEMENT_QUANTITY;

/// How a movement type maps a caller-supplied quantity to a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementDirection {
    Inbound,
    Outbound,
    /// The caller's sign is used as-is.
    Signed,
}

impl MovementType {
    pub const fn direction(&self) -> MovementDirection {
        match self {
            MovementType::In | MovementType::Return => MovementDirection::Inbound,
            MovementType::Out | MovementType::Damage | MovementType::Transfer => {
                MovementDirection::Outbound
            }
            MovementType::Adjustment => MovementDirection::Signed,
        }
    }
}

/// Converts a movement quantity into the signed delta applied to stock.
///
/// Inbound and outbound movements take a positive magnitude; adjustments
/// take a signed, non-zero correction. Magnitudes above
/// [`MAX_MOVEMENT_QUANTITY`] are refused.
///
/// ## Example
/// ```rust
/// use bazaar_core::stock::signed_delta;
/// use bazaar_core::MovementType;
///
/// assert_eq!(signed_delta(MovementType::Out, 5).unwrap(), -5);
/// assert_eq!(signed_delta(MovementType::Return, 2).unwrap(), 2);
/// assert_eq!(signed_delta(MovementType::Adjustment, -3).unwrap(), -3);
/// assert!(signed_delta(MovementType::Damage, -1).is_err());
/// ```
pub fn signed_delta(movement: MovementType, quantity: i64) -> CoreResult<i64> {
    let invalid = || CoreError::InvalidQuantity {
        movement: movement.to_string(),
        quantity,
    };

    if quantity == 0 || quantity.unsigned_abs() > MAX_MOVEMENT_QUANTITY.unsigned_abs() {
        return Err(invalid());
    }

    match movement.direction() {
        MovementDirection::Inbound if quantity > 0 => Ok(quantity),
        MovementDirection::Outbound if quantity > 0 => Ok(-quantity),
        MovementDirection::Signed => Ok(quantity),
        _ => Err(invalid()),
    }
}

/// A validated before/after pair for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockChange {
    pub previous: i64,
    pub delta: i64,
    pub new: i64,
}

impl StockChange {
    /// Applies `delta` to `previous`, refusing to go below zero or to
    /// overflow.
    pub fn apply(product_id: &str, previous: i64, delta: i64) -> CoreResult<Self> {
        let new = previous.checked_add(delta).ok_or_else(|| CoreError::InvalidQuantity {
            movement: "stock change".to_string(),
            quantity: delta,
        })?;
        if new < 0 {
            return Err(CoreError::InvalidStockState {
                product_id: product_id.to_string(),
                previous,
                delta,
            });
        }
        Ok(StockChange { previous, delta, new })
    }

    /// Rebuilds the change from the level reported after an atomic update.
    ///
    /// `None` if the pair could not have come from a valid movement.
    pub fn from_new_level(new: i64, delta: i64) -> Option<Self> {
        let previous = new.checked_sub(delta)?;
        (new >= 0 && previous >= 0).then_some(StockChange { previous, delta, new })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_table() {
        assert_eq!(signed_delta(MovementType::In, 4).unwrap(), 4);
        assert_eq!(signed_delta(MovementType::Return, 1).unwrap(), 1);
        assert_eq!(signed_delta(MovementType::Out, 4).unwrap(), -4);
        assert_eq!(signed_delta(MovementType::Damage, 2).unwrap(), -2);
        assert_eq!(signed_delta(MovementType::Transfer, 7).unwrap(), -7);
        assert_eq!(signed_delta(MovementType::Adjustment, 9).unwrap(), 9);
        assert_eq!(signed_delta(MovementType::Adjustment, -9).unwrap(), -9);
    }

    #[test]
    fn test_rejects_zero_and_wrong_sign() {
        assert!(matches!(
            signed_delta(MovementType::Adjustment, 0),
            Err(CoreError::InvalidQuantity { quantity: 0, .. })
        ));
        assert!(signed_delta(MovementType::In, -3).is_err());
        assert!(signed_delta(MovementType::Out, -3).is_err());
    }

    #[test]
    fn test_rejects_oversized_quantities() {
        assert!(signed_delta(MovementType::In, MAX_MOVEMENT_QUANTITY).is_ok());
        assert!(signed_delta(MovementType::In, MAX_MOVEMENT_QUANTITY + 1).is_err());
        assert!(signed_delta(MovementType::In, i64::MAX).is_err());
        assert!(signed_delta(MovementType::Adjustment, i64::MIN).is_err());
        assert!(signed_delta(MovementType::Adjustment, -MAX_MOVEMENT_QUANTITY).is_ok());
    }

    #[test]
    fn test_apply_keeps_invariant() {
        let change = StockChange::apply("p1", 10, -2).unwrap();
        assert_eq!(change.new, 8);
        assert_eq!(change.new, change.previous + change.delta);

        let change = StockChange::apply("p1", 3, -3).unwrap();
        assert_eq!(change.new, 0);
    }

    #[test]
    fn test_apply_refuses_negative_stock() {
        let err = StockChange::apply("p1", 3, -5).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidStockState { previous: 3, delta: -5, .. }
        ));
    }

    #[test]
    fn test_apply_refuses_overflow() {
        let err = StockChange::apply("p1", i64::MAX, 1).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuantity { quantity: 1, .. }));
    }

    #[test]
    fn test_from_new_level() {
        let change = StockChange::from_new_level(8, -2).unwrap();
        assert_eq!(change.previous, 10);
        assert_eq!(change.new, 8);

        // 3 after +5 means it started at -2
        assert!(StockChange::from_new_level(3, 5).is_none());
        assert!(StockChange::from_new_level(-1, -1).is_none());
        assert!(StockChange::from_new_level(i64::MIN + 1, 2).is_none());
    }
}
