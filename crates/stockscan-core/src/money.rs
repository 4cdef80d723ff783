//! # Money Module
//!
//! Provides the `Money` type for catalog prices.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    The catalog is priced in yen, which has no minor unit, so one        │
//! │    unit of Money is exactly ¥1. Valuation is exact integer math.        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockscan_core::money::Money;
//!
//! let price = Money::from_yen(150);
//! let shelf_value = price * 120u32;
//! assert_eq!(shelf_value.yen(), 18_000);
//! assert_eq!(shelf_value.to_string(), "¥18,000");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A non-negative monetary value in yen.
///
/// ## Design Decisions
/// - **u64 (unsigned)**: catalog prices and stock valuations are never
///   negative; stock mutation (refunds, adjustments) is out of scope
/// - **Single field tuple struct**: Zero-cost abstraction over u64
/// - **Derives**: Full serde support, serialized as a plain number
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(u64);

impl Money {
    /// Creates a Money value from whole yen.
    #[inline]
    pub const fn from_yen(yen: u64) -> Self {
        Money(yen)
    }

    /// Returns the value in yen.
    #[inline]
    pub const fn yen(&self) -> u64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero (free items).
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies a unit price by a stock count, saturating on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use stockscan_core::money::Money;
    ///
    /// let unit_price = Money::from_yen(5_800);
    /// assert_eq!(unit_price.multiply_quantity(2).yen(), 11_600);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as u64))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display renders yen with thousands separators: `¥12,000`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        write!(f, "¥{}", grouped)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

/// Multiplication by a stock count.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
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
    fn test_from_yen() {
        let money = Money::from_yen(150);
        assert_eq!(money.yen(), 150);
        assert!(!money.is_zero());
        assert!(Money::zero().is_zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_yen(0).to_string(), "¥0");
        assert_eq!(Money::from_yen(150).to_string(), "¥150");
        assert_eq!(Money::from_yen(5_800).to_string(), "¥5,800");
        assert_eq!(Money::from_yen(28_000).to_string(), "¥28,000");
        assert_eq!(Money::from_yen(1_234_567).to_string(), "¥1,234,567");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_yen(1000);
        let b = Money::from_yen(500);

        assert_eq!((a + b).yen(), 1500);
        assert_eq!((a * 3).yen(), 3000);

        let mut total = Money::zero();
        total += a;
        total += b;
        assert_eq!(total.yen(), 1500);
    }

    #[test]
    fn test_sum() {
        let total: Money = [150, 198, 110].into_iter().map(Money::from_yen).sum();
        assert_eq!(total.yen(), 458);
    }

    #[test]
    fn test_multiply_saturates() {
        let huge = Money::from_yen(u64::MAX);
        assert_eq!(huge.multiply_quantity(2).yen(), u64::MAX);
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let json = serde_json::to_string(&Money::from_yen(150)).unwrap();
        assert_eq!(json, "150");
    }
}
