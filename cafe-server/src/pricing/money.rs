//! Money helpers
//!
//! Amounts are stored as `f64` (IDR, whole rupiah) and computed with
//! `rust_decimal` so totals do not pick up binary floating point noise.

use rust_decimal::prelude::*;

/// Rupiah has no minor unit
pub const MONEY_DP: u32 = 0;

/// Convert a stored amount to `Decimal` (non-finite values become 0)
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Round to whole rupiah, half away from zero
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Round and convert back for storage
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

/// `value · percent / 100`, unrounded
pub fn percent_of(value: Decimal, percent: f64) -> Decimal {
    value * to_decimal(percent) / Decimal::ONE_HUNDRED
}
