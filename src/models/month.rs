//! Calendar month representation
//!
//! Report windows are whole months. Keeping the start of a window as a
//! `Month` instead of a date means it is always normalized to the first day.

use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;
use std::fmt;

/// Earliest year a month can be in, the first year `NaiveDate` supports
pub const MIN_YEAR: i32 = -262_143;
/// Latest year a month can be in, the last year `NaiveDate` supports
pub const MAX_YEAR: i32 = 262_142;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A calendar month (e.g., "2025-01")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Create a month, `None` if `month` is not in 1..=12 or `year` is
    /// outside `MIN_YEAR..=MAX_YEAR`
    pub fn new(year: i32, month: u32) -> Option<Self> {
        ((1..=12).contains(&month) && (MIN_YEAR..=MAX_YEAR).contains(&year))
            .then_some(Self { year, month })
    }

    /// The month containing `date`
    pub fn from_date(date: NaiveDate) -> Self {
        Self::from_index(Self::index_of(date.year(), date.month()))
    }

    fn index_of(year: i32, month: u32) -> i64 {
        i64::from(year) * 12 + i64::from(month) - 1
    }

    /// Month at `index` months after January of year 0, clamped to the
    /// supported years
    fn from_index(index: i64) -> Self {
        let index = index.clamp(
            Self::index_of(MIN_YEAR, 1),
            Self::index_of(MAX_YEAR, 12),
        );
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// The current month in local time
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        // year/month are validated on construction and day 1 always exists
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the month
    pub fn last_day(&self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Check if a date falls within this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Shift by `months` (negative goes back)
    ///
    /// Stops at the first and last supported month.
    pub fn add_months(&self, months: i64) -> Self {
        Self::from_index(Self::index_of(self.year, self.month).saturating_add(months))
    }

    /// Get the next month
    pub fn next(&self) -> Self {
        self.add_months(1)
    }

    /// Get the previous month
    pub fn prev(&self) -> Self {
        self.add_months(-1)
    }

    /// Number of months from `self` to `other` (negative if `other` is earlier)
    pub fn months_until(&self, other: Month) -> i64 {
        Self::index_of(other.year, other.month) - Self::index_of(self.year, self.month)
    }

    /// Short label for charts, e.g. "Mar 2024"
    pub fn label(&self) -> String {
        format!("{} {}", MONTH_LABELS[(self.month - 1) as usize], self.year)
    }

    /// Parse a month string ("2025-01")
    pub fn parse(s: &str) -> Result<Self, MonthParseError> {
        let s = s.trim();
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| MonthParseError::InvalidFormat(s.to_string()))?;

        let year: i32 = year
            .parse()
            .map_err(|_| MonthParseError::InvalidFormat(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| MonthParseError::InvalidFormat(s.to_string()))?;

        if !(1..=12).contains(&month) {
            return Err(MonthParseError::InvalidMonth(month));
        }
        Self::new(year, month).ok_or(MonthParseError::YearOutOfRange(year))
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Error type for month parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthParseError {
    InvalidFormat(String),
    InvalidMonth(u32),
    YearOutOfRange(i32),
}

impl fmt::Display for MonthParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthParseError::InvalidFormat(s) => write!(f, "Invalid month format: {}", s),
            MonthParseError::InvalidMonth(m) => write!(f, "Invalid month: {}", m),
            MonthParseError::YearOutOfRange(y) => {
                write!(f, "Year {} is outside {}..={}", y, MIN_YEAR, MAX_YEAR)
            }
        }
    }
}

impl std::error::Error for MonthParseError {}
