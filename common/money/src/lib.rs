use bigdecimal::{BigDecimal, ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of minor units in one major unit for two-decimal currencies.
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("amount {0} does not fit in i64 minor units")]
    OutOfRange(String),
}

/// Convert a decimal major-unit amount to integer minor units (`round(amount * 100)`).
///
/// Ties round half away from zero on the exact decimal value, so `1.005`
/// becomes `101` and `-1.005` becomes `-101`.
pub fn to_minor_units(amount: &BigDecimal) -> Result<i64, MoneyError> {
    let scaled = amount * BigDecimal::from(MINOR_UNITS_PER_MAJOR);
    let half = BigDecimal::from(1) / BigDecimal::from(2);
    let shifted = if scaled < BigDecimal::from(0) {
        scaled - half
    } else {
        scaled + half
    };
    // with_scale truncates toward zero when reducing scale.
    shifted
        .with_scale(0)
        .to_i64()
        .ok_or_else(|| MoneyError::OutOfRange(amount.to_string()))
}

/// True when the amount is strictly greater than zero.
pub fn is_positive(amount: &BigDecimal) -> bool {
    amount > &BigDecimal::from(0)
}

/// Amount expressed in integer minor units, as sent to payment providers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct MinorUnits(i64);

impl MinorUnits {
    pub fn from_major(amount: &BigDecimal) -> Result<Self, MoneyError> {
        to_minor_units(amount).map(Self)
    }
    pub fn get(&self) -> i64 { self.0 }
}

impl From<i64> for MinorUnits {
    fn from(value: i64) -> Self { Self(value) }
}
