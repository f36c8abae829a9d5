//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In floating point:                                                 │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  A cashback ledger applies percentages over and over (earn rate,    │
//! │  birthday multiplier, usage cap, commission, bonus). Binary floats  │
//! │  drift a fraction of a cent per operation and the balance stops     │
//! │  matching the sum of its movements.                                 │
//! │                                                                     │
//! │  OUR SOLUTION: Integer Cents                                        │
//! │    Rates are basis points, multipliers are hundredths, and every    │
//! │    percentage application rounds half-up exactly once.              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use optika_core::money::Money;
//! use optika_core::types::{Multiplier, Rate};
//!
//! let sale = Money::from_cents(100_000);           // R$1000.00
//! let earned = sale.apply_rate(Rate::from_bps(500)); // 5% = R$50.00
//! let doubled = earned.apply_multiplier(Multiplier::from_hundredths(200));
//! assert_eq!(doubled.cents(), 10_000);             // birthday 2x = R$100.00
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use crate::types::{Multiplier, Rate};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: the ledger stores debits and expiries as negative
///   movements, and administrative adjustments may be negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
///
/// EVERY monetary value in the system flows through this type: sale
/// totals, balances, movements, goals, and commissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use optika_core::money::Money;
    ///
    /// let balance = Money::from_cents(5_000); // R$50.00
    /// assert_eq!(balance.cents(), 5_000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
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
    ///
    /// Used when folding signed DEBIT/EXPIRED movements back into
    /// positive running totals (`total_used`, `total_expired`).
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns the smaller of two money values.
    ///
    /// ## Example
    /// ```rust
    /// use optika_core::money::Money;
    ///
    /// // max_usage_allowed = min(percent cap, balance)
    /// let cap = Money::from_cents(2_500);
    /// let balance = Money::from_cents(5_000);
    /// assert_eq!(cap.min(balance).cents(), 2_500);
    /// ```
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    /// Applies a percentage rate, rounding half-up.
    ///
    /// ## Implementation
    /// Integer math in i128 to prevent overflow on large amounts:
    /// `(cents * bps + 5000) / 10000`. The +5000 rounds the half case up.
    ///
    /// ## Example
    /// ```rust
    /// use optika_core::money::Money;
    /// use optika_core::types::Rate;
    ///
    /// let sale = Money::from_cents(100_000); // R$1000.00
    /// let earned = sale.apply_rate(Rate::from_bps(500)); // 5%
    /// assert_eq!(earned.cents(), 5_000); // R$50.00
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        let cents = (self.0 as i128 * rate.bps() as i128 + 5_000) / 10_000;
        Money::from_cents(cents as i64)
    }

    /// Scales by a multiplier expressed in hundredths (200 = 2.00x).
    ///
    /// ## Example
    /// ```rust
    /// use optika_core::money::Money;
    /// use optika_core::types::Multiplier;
    ///
    /// // Birth-month accrual doubles the earned amount
    /// let earned = Money::from_cents(5_000);
    /// let boosted = earned.apply_multiplier(Multiplier::from_hundredths(200));
    /// assert_eq!(boosted.cents(), 10_000);
    /// ```
    pub fn apply_multiplier(&self, multiplier: Multiplier) -> Money {
        let cents = (self.0 as i128 * multiplier.hundredths() as i128 + 50) / 100;
        Money::from_cents(cents as i64)
    }

    /// Clamps the value to an optional upper bound.
    ///
    /// Used for the per-sale accrual cap: `None` means uncapped.
    pub fn clamp_to(&self, cap: Option<Money>) -> Money {
        match cap {
            Some(cap) => (*self).min(cap),
            None => *self,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. Presentation layers format for locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}R${}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Negation, for storing debits and expiries as signed movements.
impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "R$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "R$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-R$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "R$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((-a).cents(), -1000);
    }

    #[test]
    fn test_apply_rate() {
        // R$1000.00 at 5% = R$50.00
        let amount = Money::from_cents(100_000);
        assert_eq!(amount.apply_rate(Rate::from_bps(500)).cents(), 5_000);

        // R$50.00 at 50% = R$25.00 (usage cap math)
        let sale = Money::from_cents(5_000);
        assert_eq!(sale.apply_rate(Rate::from_bps(5_000)).cents(), 2_500);
    }

    #[test]
    fn test_apply_rate_rounds_half_up() {
        // 125 cents at 2.5% = 3.125 cents → 3
        let amount = Money::from_cents(125);
        assert_eq!(amount.apply_rate(Rate::from_bps(250)).cents(), 3);

        // 100 cents at 0.05% = 0.05 cents → 0 (tiny accruals round to zero
        // and are still recorded by the ledger; no minimum clamp)
        let amount = Money::from_cents(100);
        assert_eq!(amount.apply_rate(Rate::from_bps(5)).cents(), 0);
    }

    #[test]
    fn test_apply_multiplier() {
        let earned = Money::from_cents(5_000);
        assert_eq!(
            earned.apply_multiplier(Multiplier::from_hundredths(200)).cents(),
            10_000
        );
        // 1.50x of 333 = 499.5 → 500
        let odd = Money::from_cents(333);
        assert_eq!(odd.apply_multiplier(Multiplier::from_hundredths(150)).cents(), 500);
    }

    #[test]
    fn test_clamp_to() {
        let earned = Money::from_cents(10_000);
        assert_eq!(earned.clamp_to(Some(Money::from_cents(3_000))).cents(), 3_000);
        assert_eq!(earned.clamp_to(Some(Money::from_cents(20_000))).cents(), 10_000);
        assert_eq!(earned.clamp_to(None).cents(), 10_000);
    }

    #[test]
    fn test_min_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);

        assert_eq!(
            Money::from_cents(2_500).min(Money::from_cents(5_000)).cents(),
            2_500
        );
    }
}
