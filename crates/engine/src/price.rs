use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest storable price, in minor units: 15 digits, 2 of them fractional.
const MAX_MINOR: i64 = 999_999_999_999_999;

/// Listing price represented as **integer minor units** (hundredths).
///
/// The value is signed so that a negative input survives parsing and is
/// rejected by validation with a proper field error instead of a parse error.
///
/// ```rust
/// use engine::Price;
///
/// assert_eq!("15000".parse::<Price>().unwrap().minor(), 1_500_000);
/// assert_eq!("10,5".parse::<Price>().unwrap().to_string(), "10.50");
/// assert!("12.345".parse::<Price>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Price(i64);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    #[error("empty price")]
    Empty,
    #[error("invalid price")]
    Invalid,
    #[error("at most 2 decimal places are allowed")]
    TooManyDecimals,
    #[error("price has too many digits")]
    TooLarge,
}

impl Price {
    pub const ZERO: Price = Price(0);

    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<i64> for Price {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Price> for i64 {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    /// Accepts `.` or `,` as decimal separator and an optional sign.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }

        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let rest = rest.trim().replace(',', ".");
        let (units_str, frac_str) = match rest.split_once('.') {
            Some((units, frac)) => (units, frac),
            None => (rest.as_str(), ""),
        };

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(PriceError::Invalid);
        }
        if !frac_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(PriceError::Invalid);
        }

        let units: i64 = units_str.parse().map_err(|_| PriceError::TooLarge)?;
        let frac: i64 = match frac_str.len() {
            0 => 0,
            1 => frac_str.parse::<i64>().map_err(|_| PriceError::Invalid)? * 10,
            2 => frac_str.parse::<i64>().map_err(|_| PriceError::Invalid)?,
            _ => return Err(PriceError::TooManyDecimals),
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(frac))
            .filter(|v| *v <= MAX_MINOR)
            .ok_or(PriceError::TooLarge)?;

        Ok(Price(if negative { -total } else { total }))
    }
}
