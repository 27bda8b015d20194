//! # Money and Quantity
//!
//! All monetary values are stored as **integer cents** and all stock
//! quantities as **integer thousandths of a unit**. No floating point
//! arithmetic is ever performed on either.
//!
//! ## Why integers?
//!
//! Floating point cannot represent most decimal fractions exactly:
//!
//! ```text
//! 0.1 + 0.2 = 0.30000000000000004  // floats
//! 10 + 20   = 30 cents             // integers
//! ```
//!
//! A register that is off by a cent fails its cash closing. Integer cents
//! make addition and subtraction exact; the only place rounding can occur
//! is a division, and every division in this crate rounds **half to even**
//! (banker's rounding) through [`div_round_half_even`], so repeated
//! roundings do not drift upward or downward.
//!
//! ## Scales
//!
//! ```text
//! ┌────────────┬───────────────┬──────────────────────────┐
//! │ Type       │ Unit          │ Example                  │
//! ├────────────┼───────────────┼──────────────────────────┤
//! │ Money      │ cents (1e-2)  │ 1050    = $10.50         │
//! │ Quantity   │ milli (1e-3)  │ 2500    = 2.500 units    │
//! │ qty × prc  │ 1e-5 units    │ 2625000 = $26.25 exact   │
//! └────────────┴───────────────┴──────────────────────────┘
//! ```
//!
//! The product of a quantity and a unit price is exact at a scale of 1e-5
//! currency units. Cart pricing keeps intermediate values at that scale (or
//! finer) in `i128` and performs a single rounding division at the end. See
//! [`crate::pricing`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Divides `numerator` by `denominator`, rounding half to even.
///
/// This is the only rounding primitive in the crate. Exact halves go to
/// the nearest even quotient, so a long run of roundings is unbiased:
///
/// ```text
/// 12.5 → 12    13.5 → 14    -12.5 → -12    -13.5 → -14
/// ```
///
/// The denominator must be positive; callers always pass a power of ten.
pub(crate) fn div_round_half_even(numerator: i128, denominator: i128) -> i128 {
    debug_assert!(denominator > 0);
    let quotient = numerator.div_euclid(denominator);
    let remainder = numerator.rem_euclid(denominator);
    // remainder is in [0, denominator), even for negative numerators
    let doubled = remainder * 2;
    if doubled > denominator || (doubled == denominator && quotient % 2 != 0) {
        quotient + 1
    } else {
        quotient
    }
}

/// A monetary amount in integer cents.
///
/// Construct with [`Money::from_cents`] or [`Money::from_major_minor`]:
///
/// ```
/// use caja_core::Money;
///
/// let price = Money::from_cents(1050);
/// assert_eq!(price.to_string(), "$10.50");
/// assert_eq!(price + Money::from_cents(50), Money::from_major_minor(11, 0));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Money(i64);

impl Money {
    /// Creates a money value from integer cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a money value from whole units and cents.
    ///
    /// For negative amounts the sign is taken from `major`; `minor` is the
    /// magnitude of the cent part. `from_major_minor(-10, 50)` is −$10.50.
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// The zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Total value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole currency units (truncated toward zero).
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Cent part as a value in 0..100.
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

/// A stock or cart quantity in integer thousandths of a unit.
///
/// Three decimal places cover weighed goods (1.250 kg) while keeping
/// piece-counted goods exact (2.000 units). Quantities multiply against
/// [`Money`] without loss: the product lands at a scale of 1e-5 currency
/// units.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Quantity(i64);

impl Quantity {
    /// Creates a quantity from integer thousandths.
    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Quantity(milli)
    }

    /// Creates a whole-unit quantity.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * 1000)
    }

    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    /// Value in thousandths of a unit.
    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    /// Whole units (truncated toward zero).
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 1000
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:03}", sign, self.units().abs(), (self.0 % 1000).abs())
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 + rhs.0)
    }
}

impl Sub for Quantity {
    type Output = Quantity;

    fn sub(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 - rhs.0)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_construction() {
        assert_eq!(Money::from_cents(1050).cents(), 1050);
        assert_eq!(Money::from_major_minor(10, 50).cents(), 1050);
        assert_eq!(Money::from_major_minor(-10, 50).cents(), -1050);
        assert_eq!(Money::zero().cents(), 0);
        assert_eq!(Money::default(), Money::zero());
    }

    #[test]
    fn test_money_parts() {
        let m = Money::from_cents(1099);
        assert_eq!(m.units(), 10);
        assert_eq!(m.cents_part(), 99);

        let n = Money::from_cents(-1099);
        assert_eq!(n.units(), -10);
        assert_eq!(n.cents_part(), 99);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(1050).to_string(), "$10.50");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(0).to_string(), "$0.00");
        assert_eq!(Money::from_cents(-250).to_string(), "-$2.50");
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);
        assert_eq!((a + b).cents(), 1250);
        assert_eq!((a - b).cents(), 750);
        assert_eq!((b - a).cents(), -750);

        let mut acc = Money::zero();
        acc += a;
        acc += b;
        assert_eq!(acc.cents(), 1250);
        acc -= b;
        assert_eq!(acc, a);
    }

    #[test]
    fn test_money_predicates() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_cents(1).is_positive());
        assert!(Money::from_cents(-1).is_negative());
        assert_eq!(Money::from_cents(-500).abs().cents(), 500);
    }

    #[test]
    fn test_quantity_construction() {
        assert_eq!(Quantity::from_units(2).milli(), 2000);
        assert_eq!(Quantity::from_milli(1250).units(), 1);
        assert!(Quantity::from_milli(1).is_positive());
        assert!(Quantity::zero().is_zero());
    }

    #[test]
    fn test_quantity_display() {
        assert_eq!(Quantity::from_milli(2500).to_string(), "2.500");
        assert_eq!(Quantity::from_units(3).to_string(), "3.000");
        assert_eq!(Quantity::from_milli(-750).to_string(), "-0.750");
    }

    #[test]
    fn test_quantity_arithmetic() {
        let a = Quantity::from_milli(1500);
        let b = Quantity::from_milli(500);
        assert_eq!((a + b).milli(), 2000);
        assert_eq!((a - b).milli(), 1000);
    }

    #[test]
    fn test_half_even_rounds_ties_to_even() {
        // exact halves
        assert_eq!(div_round_half_even(125, 10), 12); // 12.5 → 12
        assert_eq!(div_round_half_even(135, 10), 14); // 13.5 → 14
        assert_eq!(div_round_half_even(25, 10), 2); // 2.5 → 2
        assert_eq!(div_round_half_even(35, 10), 4); // 3.5 → 4

        // non-halves round to nearest
        assert_eq!(div_round_half_even(124, 10), 12);
        assert_eq!(div_round_half_even(126, 10), 13);

        // exact divisions stay exact
        assert_eq!(div_round_half_even(120, 10), 12);
    }

    #[test]
    fn test_half_even_negative_numerators() {
        assert_eq!(div_round_half_even(-125, 10), -12); // -12.5 → -12
        assert_eq!(div_round_half_even(-135, 10), -14); // -13.5 → -14
        assert_eq!(div_round_half_even(-124, 10), -12);
        assert_eq!(div_round_half_even(-126, 10), -13);
    }

    #[test]
    fn test_half_even_is_unbiased_over_a_run() {
        // Ties alternate up and down, so the sum of rounded values over a
        // symmetric run equals the sum of the exact values.
        let rounded: i128 = (0..100).map(|n| div_round_half_even(n * 10 + 5, 10)).sum();
        let exact_doubled: i128 = (0..100).map(|n| n * 10 + 5).sum::<i128>() / 5;
        assert_eq!(rounded * 2, exact_doubled);
    }
}
