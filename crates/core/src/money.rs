//! Minor/major currency unit conversion.
//!
//! Amounts are stored and aggregated as `i64` minor units (cents). They are
//! converted to [`Decimal`] major units only when presented.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::constants::{DISPLAY_DECIMAL_PRECISION, MINOR_UNIT_SCALE};
use crate::errors::{Result, ValidationError};

/// Converts minor units (cents) to major units.
pub fn to_major(minor: i64) -> Decimal {
    Decimal::new(minor, MINOR_UNIT_SCALE)
}

/// Converts major units to minor units, rejecting sub-cent precision.
pub fn to_minor(major: Decimal) -> Result<i64> {
    let scaled = major * Decimal::from(10_i64.pow(MINOR_UNIT_SCALE));
    if scaled.fract() != Decimal::ZERO {
        return Err(ValidationError::AmountOutOfRange(major.to_string()).into());
    }
    scaled
        .to_i64()
        .ok_or_else(|| ValidationError::AmountOutOfRange(major.to_string()).into())
}

/// `part / whole * 100`, rounded for display; zero when `whole` is zero.
pub fn percentage_of(part: i64, whole: i64) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(whole))
        .round_dp(DISPLAY_DECIMAL_PRECISION)
}
