//! # Money Module
//!
//! Provides the `Money` type for monetary values and `CommissionRate` for
//! the platform's cut.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    33.33 × 0.05 = 1.6665000000000001   ❌ not a payable amount          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units + basis points                       │
//! │    3333 × 500 / 10000 = 166.65 → 167 (round half up)                    │
//! │    net = 3333 - 167 = 3166                                              │
//! │    commission + net == sale, for every record and every report          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bazaar_core::money::{CommissionRate, Money};
//!
//! let price = Money::from_cents(20_000); // 200.00
//! let sale = price * 2;                  // 400.00
//! let cut = sale.apply_rate(CommissionRate::PLATFORM_DEFAULT);
//! assert_eq!(cut.cents(), 2_000);        // 20.00
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::COMMISSION_RATE_BPS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paise, cents, ...).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds and reversals
/// - **Single field tuple struct**: Zero-cost abstraction over i64
///
/// ## Where Money Flows
/// ```text
/// OrderItem.unit_price ──► SaleAmounts.sale_amount ──┬──► platform_commission
///                                                    └──► net_amount
///                                                              │
///                          SalesBreakdown totals ◄─────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// let price = Money::from_cents(3333); // 33.33
    /// assert_eq!(price.cents(), 3333);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Applies a basis-point rate, rounding half away from zero to the
    /// minor unit.
    ///
    /// ## Implementation
    /// `(|amount| * bps + 5000) / 10000`, sign restored afterwards so that
    /// a reversal is the exact negation of the original charge.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::{CommissionRate, Money};
    ///
    /// let rate = CommissionRate::from_bps(500);
    /// assert_eq!(Money::from_cents(3333).apply_rate(rate).cents(), 167);
    /// assert_eq!(Money::from_cents(-3333).apply_rate(rate).cents(), -167);
    /// assert_eq!(Money::from_cents(25_000).apply_rate(rate).cents(), 1_250);
    /// ```
    pub fn apply_rate(&self, rate: CommissionRate) -> Money {
        // i128 keeps large order totals from overflowing
        let magnitude = (self.0.unsigned_abs() as i128 * rate.bps() as i128 + 5000) / 10000;
        let cents = magnitude as i64;
        if self.0 < 0 {
            Money(-cents)
        } else {
            Money(cents)
        }
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(5_000);
    /// assert_eq!(unit_price.multiply_quantity(5).cents(), 25_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering ("1234.50"), currency-agnostic.
///
/// ## Note
/// For logs and the operator tool. Dashboards format with locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Summation over report rows.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Commission Rate
// =============================================================================

/// Platform commission rate in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 500 bps = 5% (the platform default)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommissionRate(u32);

impl CommissionRate {
    /// The platform-wide 5% rate.
    pub const PLATFORM_DEFAULT: CommissionRate = CommissionRate(COMMISSION_RATE_BPS);

    /// Upper bound: 100%.
    pub const MAX_BPS: u32 = 10_000;

    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        CommissionRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Default for CommissionRate {
    fn default() -> Self {
        CommissionRate::PLATFORM_DEFAULT
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
