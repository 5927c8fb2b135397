//! # Commission Split
//!
//! Derives the financial columns of a sales record from one order line.
//!
//! ```text
//! unit_price × quantity ──► sale_amount
//!                               │
//!               ┌───────────────┴────────────────┐
//!               ▼                                ▼
//!   platform_commission = round(sale × rate)   net_amount = sale - commission
//! ```
//!
//! The net amount is derived by subtraction, never by applying `1 - rate`,
//! so the two halves always add back up to the sale amount.

use serde::{Deserialize, Serialize};

use crate::money::{CommissionRate, Money};

/// The computed money split for one sold line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleAmounts {
    pub unit_price: Money,
    pub quantity: i64,
    pub sale_amount: Money,
    pub platform_commission: Money,
    pub net_amount: Money,
}

impl SaleAmounts {
    /// Computes sale, commission and net amounts for a line.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::commission::SaleAmounts;
    /// use bazaar_core::money::{CommissionRate, Money};
    ///
    /// let line = SaleAmounts::compute(Money::from_cents(5_000), 5, CommissionRate::PLATFORM_DEFAULT);
    /// assert_eq!(line.sale_amount.cents(), 25_000);
    /// assert_eq!(line.platform_commission.cents(), 1_250);
    /// assert_eq!(line.net_amount.cents(), 23_750);
    /// ```
    pub fn compute(unit_price: Money, quantity: i64, rate: CommissionRate) -> Self {
        let sale_amount = unit_price.multiply_quantity(quantity);
        let platform_commission = sale_amount.apply_rate(rate);
        let net_amount = sale_amount - platform_commission;

        SaleAmounts {
            unit_price,
            quantity,
            sale_amount,
            platform_commission,
            net_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: CommissionRate = CommissionRate::PLATFORM_DEFAULT;

    #[test]
    fn test_three_units_at_one_hundred() {
        let line = SaleAmounts::compute(Money::from_cents(10_000), 3, RATE);
        assert_eq!(line.sale_amount.cents(), 30_000);
        assert_eq!(line.platform_commission.cents(), 1_500);
        assert_eq!(line.net_amount.cents(), 28_500);
    }

    #[test]
    fn test_sub_cent_commission_rounds_half_up() {
        let line = SaleAmounts::compute(Money::from_cents(3333), 1, RATE);
        assert_eq!(line.platform_commission.cents(), 167);
        assert_eq!(line.net_amount.cents(), 3166);
    }

    #[test]
    fn test_two_vendor_order_lines() {
        let a = SaleAmounts::compute(Money::from_cents(20_000), 2, RATE);
        assert_eq!(a.sale_amount.cents(), 40_000);
        assert_eq!(a.platform_commission.cents(), 2_000);
        assert_eq!(a.net_amount.cents(), 38_000);

        let b = SaleAmounts::compute(Money::from_cents(5_000), 5, RATE);
        assert_eq!(b.sale_amount.cents(), 25_000);
        assert_eq!(b.platform_commission.cents(), 1_250);
        assert_eq!(b.net_amount.cents(), 23_750);
    }

    #[test]
    fn test_always_balanced() {
        for price in [1, 9, 10, 99, 3333, 12_345, 999_999] {
            for qty in [1, 2, 7, 13] {
                let line = SaleAmounts::compute(Money::from_cents(price), qty, RATE);
                assert_eq!(
                    line.platform_commission + line.net_amount,
                    line.sale_amount,
                    "price={price} qty={qty}"
                );
            }
        }
    }

    #[test]
    fn test_zero_rate_keeps_everything_for_vendor() {
        let line = SaleAmounts::compute(Money::from_cents(1_000), 2, CommissionRate::from_bps(0));
        assert!(line.platform_commission.is_zero());
        assert_eq!(line.net_amount, line.sale_amount);
    }
}
