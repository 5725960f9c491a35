//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  On a fiscal invoice every base and every tax amount is audited, so     │
//! │  one stray cent between the breakdown and the persisted invoice is a    │
//! │  compliance defect.                                                     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every amount at rest is i64 cents. Intermediate tax math runs on     │
//! │    exact scaled i128 values and is rounded ONCE, half-up, at the end.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use folio_core::money::Money;
//!
//! let price = Money::from_cents(10000); // L 100.00
//! let line = price * 3i64;              // L 300.00
//! assert_eq!(line.cents(), 30000);
//!
//! // 90.00 scaled by 10^4 rounds back to exactly 9000 cents
//! assert_eq!(Money::from_scaled_half_up(90_000_000, 10_000).cents(), 9000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: change and outstanding balances are differences
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money is Used
/// ```text
/// CartLine.unit_price ──► TaxBreakdown (exact, scaled) ──► Invoice totals
///                                                             │
/// Tender.amount ──► Settlement (paid / change / outstanding) ◄┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use folio_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Rounds an exact scaled amount to cents, half away from zero.
    ///
    /// `value` is expressed in cents multiplied by `scale`
    /// (e.g. `scale = 10_000` for an amount that went through one
    /// basis-point multiplication).
    ///
    /// ## Example
    /// ```rust
    /// use folio_core::money::Money;
    ///
    /// // 0.825 cents x 10^4 → 1 cent (half-up)
    /// assert_eq!(Money::from_scaled_half_up(5_000, 10_000).cents(), 1);
    /// assert_eq!(Money::from_scaled_half_up(4_999, 10_000).cents(), 0);
    /// ```
    pub fn from_scaled_half_up(value: i128, scale: i128) -> Money {
        let half = scale / 2;
        let rounded = if value >= 0 {
            (value + half) / scale
        } else {
            (value - half) / scale
        };
        Money(rounded as i64)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
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

    /// Clamps negative values to zero.
    ///
    /// ## Example
    /// ```rust
    /// use folio_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-350).non_negative(), Money::zero());
    /// assert_eq!(Money::from_cents(350).non_negative().cents(), 350);
    /// ```
    #[inline]
    pub const fn non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-oriented display; the presentation layer owns localized formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
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
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(10350).to_string(), "103.50");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3i64).cents(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_round_half_up_boundaries() {
        // exactly half rounds up
        assert_eq!(Money::from_scaled_half_up(15_000, 10_000).cents(), 2);
        assert_eq!(Money::from_scaled_half_up(14_999, 10_000).cents(), 1);
        // half of a cent at the 10^8 scale
        assert_eq!(Money::from_scaled_half_up(50_000_000, 100_000_000).cents(), 1);
        // symmetric for negative values
        assert_eq!(Money::from_scaled_half_up(-15_000, 10_000).cents(), -2);
    }

    #[test]
    fn test_non_negative() {
        assert!(Money::from_cents(-1).non_negative().is_zero());
        assert_eq!(Money::from_cents(1).non_negative().cents(), 1);
    }
}
