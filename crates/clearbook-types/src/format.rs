//! Presentation helpers for fixed-point values.

use rust_decimal::{Decimal, RoundingStrategy};

/// Render `value` with exactly `precision` decimal places, rounding down.
///
/// Pure: the precision is always passed in, never captured.
#[must_use]
pub fn format_fixed(value: Decimal, precision: u32) -> String {
    let mut shown = value.round_dp_with_strategy(precision, RoundingStrategy::ToNegativeInfinity);
    shown.rescale(precision);
    shown.to_string()
}

/// Floor `value` to `scale` decimal places.
#[must_use]
pub fn floor_to_scale(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::ToNegativeInfinity)
}

/// Smallest representable step at `scale`, e.g. `0.01` for scale 2.
#[must_use]
pub fn unit_at_scale(scale: u32) -> Decimal {
    Decimal::new(1, scale)
}
