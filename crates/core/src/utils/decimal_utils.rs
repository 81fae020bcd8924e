//! Helpers for moving between USD decimals and integer cents.

use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::{CENTS_PER_DOLLAR, DISPLAY_DECIMAL_PRECISION};
use crate::errors::{Error, Result, ValidationError};

/// Rounds a USD amount to whole cents, half away from zero.
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(
        DISPLAY_DECIMAL_PRECISION,
        RoundingStrategy::MidpointAwayFromZero,
    )
}

/// Converts a USD amount into integer cents, rounding half away from zero.
pub fn usd_to_cents(amount: Decimal) -> Result<i64> {
    (amount * Decimal::from(CENTS_PER_DOLLAR))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| {
            Error::Validation(ValidationError::InvalidInput(format!(
                "Amount {} does not fit in cents",
                amount
            )))
        })
}

/// Converts integer cents into a USD amount with two decimal places.
pub fn cents_to_usd(cents: i64) -> Decimal {
    Decimal::new(cents, DISPLAY_DECIMAL_PRECISION)
}

/// Formats a USD amount with exactly two decimal places.
pub fn format_usd(amount: Decimal) -> String {
    format!("{:.2}", round_to_cents(amount))
}
