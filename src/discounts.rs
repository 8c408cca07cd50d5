//! Discounts
//!
//! Minor-unit arithmetic shared by every promotion kind. Amounts are carried
//! as [`Decimal`] while a line is being priced and rounded exactly once at the
//! end, so half-price units on odd prices don't accumulate rounding error.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,
}

/// Returns the fraction of the price still charged after `percent` is taken off.
pub fn remaining_fraction(percent: &Percentage) -> Decimal {
    // decimal_percentage doesn't expose the inner Decimal
    Decimal::ONE - ((*percent) * Decimal::ONE)
}

/// Price a line where `full_units` are charged in full and `discounted_units`
/// have `percent` taken off, returning the total in minor units.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the intermediate amount
/// overflows the decimal range or the rounded total doesn't fit an `i64`.
pub fn line_total_minor(
    unit_minor: i64,
    full_units: u32,
    discounted_units: u32,
    percent: &Percentage,
) -> Result<i64, DiscountError> {
    let unit = Decimal::from(unit_minor);

    let full = unit
        .checked_mul(Decimal::from(full_units))
        .ok_or(DiscountError::PercentConversion)?;

    let discounted = unit
        .checked_mul(Decimal::from(discounted_units))
        .and_then(|amount| amount.checked_mul(remaining_fraction(percent)))
        .ok_or(DiscountError::PercentConversion)?;

    full.checked_add(discounted)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}
