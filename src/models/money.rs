//! Money type for representing currency amounts
//!
//! Amounts are stored in minor units (i64) to avoid floating-point precision
//! issues. How many minor units make a major unit depends on the currency, so
//! parsing and plain rendering take the currency's decimal count.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A monetary amount in minor units of its currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from minor units
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in minor units
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Check if the amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if the amount is positive
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Check if the amount is negative
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Get the absolute value
    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Minor units per major unit, `None` when it does not fit an `i64`
    pub fn scale(decimals: u32) -> Option<i64> {
        10i64.checked_pow(decimals)
    }

    /// The amount in major units, for statistics and charts
    pub fn as_major(&self, decimals: u32) -> f64 {
        self.0 as f64 / 10f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX))
    }

    /// Parse an amount written in major units, e.g. "-10.5" with 2 decimals
    ///
    /// Extra fraction digits beyond `decimals` are rejected rather than rounded.
    pub fn parse(s: &str, decimals: u32) -> Result<Self, MoneyParseError> {
        let invalid = || MoneyParseError::InvalidFormat(s.to_string());
        let trimmed = s.trim();

        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (whole, fraction) = match body.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (body, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if fraction.len() > decimals as usize {
            return Err(MoneyParseError::TooManyDecimals {
                input: s.to_string(),
                decimals,
            });
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let scale = Self::scale(decimals).ok_or(MoneyParseError::UnsupportedDecimals(decimals))?;
        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let fraction: i64 = if fraction.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", fraction, width = decimals as usize);
            padded.parse().map_err(|_| invalid())?
        };

        let minor = whole
            .checked_mul(scale)
            .and_then(|w| w.checked_add(fraction))
            .ok_or_else(invalid)?;

        Ok(Self(if negative { -minor } else { minor }))
    }

    /// Plain rendering with `decimals` fraction digits and a `.` separator
    pub fn to_decimal_string(&self, decimals: u32) -> String {
        if decimals == 0 {
            return self.0.to_string();
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        let (whole, fraction) = split_minor(self.0.unsigned_abs(), decimals);
        format!(
            "{}{}.{:0width$}",
            sign,
            whole,
            fraction,
            width = decimals as usize
        )
    }
}

/// Whole and fraction parts of `magnitude` minor units
///
/// When a major unit has more minor units than a `u64` holds, every amount is
/// a fraction of one.
pub(crate) fn split_minor(magnitude: u64, decimals: u32) -> (u64, u64) {
    match 10u64.checked_pow(decimals) {
        Some(scale) => (magnitude / scale, magnitude % scale),
        None => (0, magnitude),
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string(2))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
    TooManyDecimals { input: String, decimals: u32 },
    UnsupportedDecimals(u32),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
            MoneyParseError::TooManyDecimals { input, decimals } => {
                write!(f, "{} has more than {} decimal places", input, decimals)
            }
            MoneyParseError::UnsupportedDecimals(decimals) => {
                write!(f, "Amounts cannot have {} decimal places", decimals)
            }
        }
    }
}

impl std::error::Error for MoneyParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(1050).to_string(), "10.50");
        assert_eq!(Money::from_minor(0).to_string(), "0.00");
        assert_eq!(Money::from_minor(-1050).to_string(), "-10.50");
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
    }

    #[test]
    fn test_decimal_string_respects_decimals() {
        assert_eq!(Money::from_minor(1234).to_decimal_string(0), "1234");
        assert_eq!(Money::from_minor(1234).to_decimal_string(3), "1.234");
        assert_eq!(Money::from_minor(-5).to_decimal_string(3), "-0.005");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        assert_eq!((-a).minor(), -1000);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("10.50", 2).unwrap().minor(), 1050);
        assert_eq!(Money::parse("-10.50", 2).unwrap().minor(), -1050);
        assert_eq!(Money::parse("10", 2).unwrap().minor(), 1000);
        assert_eq!(Money::parse("10.5", 2).unwrap().minor(), 1050);
        assert_eq!(Money::parse(".05", 2).unwrap().minor(), 5);
        assert_eq!(Money::parse("1500", 0).unwrap().minor(), 1500);
        assert_eq!(Money::parse("1.005", 3).unwrap().minor(), 1005);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("", 2).is_err());
        assert!(Money::parse("abc", 2).is_err());
        assert!(Money::parse("1.2.3", 2).is_err());
        assert!(matches!(
            Money::parse("1.234", 2),
            Err(MoneyParseError::TooManyDecimals { decimals: 2, .. })
        ));
    }

    #[test]
    fn test_oversized_decimals_do_not_overflow() {
        assert_eq!(
            Money::parse("1", 25),
            Err(MoneyParseError::UnsupportedDecimals(25))
        );
        assert_eq!(Money::scale(18), Some(1_000_000_000_000_000_000));
        assert_eq!(Money::scale(19), None);
        assert_eq!(
            Money::from_minor(-12345).to_decimal_string(25),
            "-0.0000000000000000000012345"
        );
        assert_eq!(
            Money::from_minor(i64::MIN).to_decimal_string(19),
            "-0.9223372036854775808"
        );
        assert_eq!(Money::from_minor(7).as_major(u32::MAX), 0.0);
    }

    #[test]
    fn test_as_major() {
        assert_eq!(Money::from_minor(1050).as_major(2), 10.5);
        assert_eq!(Money::from_minor(7).as_major(0), 7.0);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 200, 300].into_iter().map(Money::from_minor).sum();
        assert_eq!(total.minor(), 600);
    }
}
