//! Monetary rounding.
//!
//! All amounts are `Decimal` in the currency's standard unit (dollars, not
//! cents). Rounding is half-up on cents, and results always carry exactly two
//! decimal places so they render as `"12.50"` rather than `"12.5"`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept on every monetary value.
pub const CENTS_SCALE: u32 = 2;

/// Round an amount to whole cents, half away from zero.
///
/// ```
/// use rust_decimal::Decimal;
/// use shopfront_core::round_cents;
///
/// assert_eq!(round_cents(Decimal::new(12_345, 3)).to_string(), "12.35");
/// assert_eq!(round_cents(Decimal::new(7, 0)).to_string(), "7.00");
/// ```
#[must_use]
pub fn round_cents(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(CENTS_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(CENTS_SCALE);
    rounded
}
