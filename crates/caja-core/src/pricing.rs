//! Cart pricing.
//!
//! A cart total is computed in one pass of exact integer arithmetic:
//!
//! ```text
//! quantity (1e-3) × unit price (1e-2)          = line amount  (1e-5, exact)
//! Σ line amounts                               = subtotal     (1e-5, exact)
//! subtotal × (10000 − disc_bps) × (10000 + sur_bps)
//!                                              = total        (1e-13, exact)
//! single half-even division by 1e11            = total in cents
//! ```
//!
//! Intermediate values live in `i128`, so nothing can overflow for any
//! realistic cart, and exactly one rounding happens per computed amount.
//!
//! Worked example: two units at $10.00 plus one at $5.00 with a 10%
//! discount is 25.00 × 0.90 = $22.50, exact.

use crate::money::{div_round_half_even, Money, Quantity};
use crate::types::{Rate, SaleLineInput};

/// 1e-5 currency units per cent.
const E5_PER_CENT: i128 = 1_000;

/// 1e-13 currency units per cent, the scale after applying two rates.
const E13_PER_CENT: i128 = 100_000_000_000;

/// Exact cart subtotal at a scale of 1e-5 currency units.
fn subtotal_e5(lines: &[SaleLineInput]) -> i128 {
    lines
        .iter()
        .map(|line| line.quantity.milli() as i128 * line.unit_price.cents() as i128)
        .sum()
}

/// A single line amount rounded to cents.
///
/// Used for receipt display; the sale total is **not** a sum of rounded
/// lines but a single rounding of the exact subtotal, so per-line display
/// may differ from the header total by a cent on fractional quantities.
pub fn line_total(quantity: Quantity, unit_price: Money) -> Money {
    let e5 = quantity.milli() as i128 * unit_price.cents() as i128;
    Money::from_cents(div_round_half_even(e5, E5_PER_CENT) as i64)
}

/// Cart subtotal before discount and surcharge, rounded to cents.
pub fn subtotal(lines: &[SaleLineInput]) -> Money {
    Money::from_cents(div_round_half_even(subtotal_e5(lines), E5_PER_CENT) as i64)
}

/// Final cart total: subtotal with the discount and surcharge applied,
/// rounded half-to-even to cents in a single step.
pub fn final_total(lines: &[SaleLineInput], discount: Rate, surcharge: Rate) -> Money {
    let gross = subtotal_e5(lines);
    let scaled = gross
        * (10_000 - discount.bps() as i128)
        * (10_000 + surcharge.bps() as i128);
    Money::from_cents(div_round_half_even(scaled, E13_PER_CENT) as i64)
}

// =============================================================================
// Tests
// =============================================================================
