//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With floats:                                                           │
//! │    1500000.10 * 0.3 = 450000.02999999997                                │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    150000010 cents * 3000 bps / 10000 = 45000003 cents                  │
//! │    Commission math is exact and rounding happens exactly once          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Persisted state and export files carry amounts as plain JSON numbers in
//! major units (`1500000`, `450000.5`). `Money` converts at the serde boundary
//! and never stores a float.
//!
//! ## Usage
//! ```rust
//! use reserva_core::money::Money;
//!
//! let total = Money::from_major(1_000_000.0).unwrap();
//! assert_eq!(total.cents(), 100_000_000);
//!
//! let sum = total + Money::from_cents(50);
//! assert_eq!(sum.to_string(), "$1000000.50");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use crate::types::CommissionRate;

/// Largest major-unit magnitude accepted from user input or JSON.
///
/// Keeps `major * 100` well inside `i64` and inside the range where `f64`
/// still represents every cent exactly.
const MAX_MAJOR_UNITS: f64 = 90_000_000_000_000.0;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## User Workflow Context
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  Form input "1500000" ──► SaleRecord.total_amount ──► commission (30%)  │
/// │                                   │                                     │
/// │                                   └──► Metrics: totals, averages,       │
/// │                                        per-agent and monthly rollups    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a major-unit amount, rounding to the cent.
    ///
    /// Returns `None` for NaN, infinities and magnitudes too large to hold.
    ///
    /// ## Example
    /// ```rust
    /// use reserva_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(10.995).unwrap().cents(), 1100);
    /// assert!(Money::from_major(f64::NAN).is_none());
    /// ```
    pub fn from_major(amount: f64) -> Option<Self> {
        if !amount.is_finite() || amount.abs() > MAX_MAJOR_UNITS {
            return None;
        }
        // Half-up rounding on the decimal string representation, so that
        // 1.005 becomes 1.01 the way a person reading the number expects.
        let cents: f64 = format!("{amount}e2").parse().ok()?;
        Some(Money(cents.round() as i64))
    }

    /// Parses a user-entered amount such as `"1500000"` or `" 2200000.50 "`.
    pub fn parse(input: &str) -> Option<Self> {
        input.trim().parse::<f64>().ok().and_then(Money::from_major)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole major units (truncated toward zero).
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the value in major units as a float (for display and JSON only).
    #[inline]
    pub fn as_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Calculates the commission owed on this amount.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`. The +5000 rounds half
    /// away from zero for positive amounts, which is the same as rounding the
    /// major-unit product to two decimals.
    ///
    /// ## Example
    /// ```rust
    /// use reserva_core::money::Money;
    /// use reserva_core::types::CommissionRate;
    ///
    /// let total = Money::from_cents(5); // $0.05
    /// // 0.05 × 30% = 0.015 → 0.02
    /// assert_eq!(total.commission(CommissionRate::STANDARD).cents(), 2);
    /// ```
    pub fn commission(&self, rate: CommissionRate) -> Money {
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money(cents as i64)
    }

    /// Divides this amount evenly across `count` items, rounding half-up to the
    /// cent. Returns zero when `count` is zero.
    pub fn average_over(&self, count: usize) -> Money {
        if count == 0 {
            return Money::zero();
        }
        let n = count as i128;
        let doubled = self.0 as i128 * 2;
        let rounded = if doubled >= 0 {
            (doubled + n) / (2 * n)
        } else {
            (doubled - n) / (2 * n)
        };
        Money(rounded as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display. Locale formatting lives in [`crate::format`].
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// Sums of many large sales saturate at the `i64` bounds instead of wrapping
// or panicking.
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

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Whole amounts are written as integers, everything else as a decimal.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.cents_part() == 0 {
            serializer.serialize_i64(self.units())
        } else {
            serializer.serialize_f64(self.as_major())
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Money::from_major(amount)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid amount: {amount}")))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major_rounds_to_cent() {
        assert_eq!(Money::from_major(1500000.0).unwrap().cents(), 150_000_000);
        assert_eq!(Money::from_major(10.994).unwrap().cents(), 1099);
        assert_eq!(Money::from_major(1.005).unwrap().cents(), 101);
        assert!(Money::from_major(f64::INFINITY).is_none());
        assert!(Money::from_major(1e20).is_none());
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse(" 2200000 ").unwrap().cents(), 220_000_000);
        assert_eq!(Money::parse("99.5").unwrap().cents(), 9950);
        assert!(Money::parse("").is_none());
        assert!(Money::parse("abc").is_none());
        assert!(Money::parse("NaN").is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_commission_thirty_percent() {
        let rate = CommissionRate::STANDARD;
        assert_eq!(
            Money::from_major(1_000_000.0).unwrap().commission(rate),
            Money::from_major(300_000.0).unwrap()
        );
        assert_eq!(Money::from_cents(1).commission(rate).cents(), 0);
        assert_eq!(Money::from_cents(2).commission(rate).cents(), 1);
        assert_eq!(Money::from_cents(150_000_010).commission(rate).cents(), 45_000_003);
    }

    #[test]
    fn test_average_over() {
        assert_eq!(Money::from_cents(1000).average_over(3).cents(), 333);
        assert_eq!(Money::from_cents(1001).average_over(2).cents(), 501);
        assert_eq!(Money::from_cents(1000).average_over(0), Money::zero());
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, 650].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 1000);
    }

    #[test]
    fn test_large_sums_saturate() {
        let largest = Money::parse("90000000000000").unwrap();
        let total: Money = std::iter::repeat(largest).take(1_100).sum();
        assert_eq!(total.cents(), i64::MAX);

        let mut running = Money::zero();
        for _ in 0..1_100 {
            running += largest;
        }
        assert_eq!(running, total);
        assert_eq!((Money::from_cents(i64::MIN) - largest).cents(), i64::MIN);
    }

    #[test]
    fn test_serde_uses_major_units() {
        assert_eq!(serde_json::to_string(&Money::from_cents(150_000_000)).unwrap(), "1500000");
        assert_eq!(serde_json::to_string(&Money::from_cents(45_000_050)).unwrap(), "450000.5");

        let parsed: Money = serde_json::from_str("660000").unwrap();
        assert_eq!(parsed.cents(), 66_000_000);
        let parsed: Money = serde_json::from_str("0.3").unwrap();
        assert_eq!(parsed.cents(), 30);
        assert!(serde_json::from_str::<Money>("\"12\"").is_err());
    }
}
