//! Per-period report data
//!
//! The aggregator produces one value per month of the window; the navigator
//! wraps those values into points and keeps the summary statistics next to
//! them.

use serde::Serialize;

use crate::models::{Currency, EntityId, EntityKind, Money, Month};

use super::period_length::clamp_period_length;

/// Parameters of a report window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportWindow {
    /// First month of the window
    pub start: Month,
    /// Number of months, in `1..=MAX_PERIOD_LENGTH`
    pub length: u32,
    pub currency: Currency,
}

impl ReportWindow {
    /// `length` is clamped to `1..=MAX_PERIOD_LENGTH`
    pub fn new(start: Month, length: u32, currency: Currency) -> Self {
        Self {
            start,
            length: clamp_period_length(length),
            currency,
        }
    }

    /// Last month of the window
    pub fn end(&self) -> Month {
        self.start.add_months(i64::from(clamp_period_length(self.length)) - 1)
    }

    /// Every month of the window in order
    pub fn months(&self) -> impl Iterator<Item = Month> + '_ {
        (0..clamp_period_length(self.length)).map(move |i| self.start.add_months(i64::from(i)))
    }
}

/// Arguments of one aggregation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodQuery {
    pub start: Month,
    pub length: u32,
    pub currency: Currency,
    pub kind: EntityKind,
    pub entity: EntityId,
}

impl PeriodQuery {
    pub fn new(window: &ReportWindow, kind: EntityKind, entity: EntityId) -> Self {
        Self {
            start: window.start,
            length: window.length,
            currency: window.currency.clone(),
            kind,
            entity,
        }
    }

    /// Transaction column the query filters on
    pub fn column(&self) -> &'static str {
        self.kind.column()
    }
}

/// Aggregated amount of one month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodValue {
    pub month: Month,
    pub value: Money,
}

/// Per-month values of a window plus summary statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDataByPeriod {
    pub values: Vec<PeriodValue>,
    pub min: Money,
    pub max: Money,
    pub abs_min: Money,
    pub abs_max: Money,
    pub sum: Money,
    /// Mean over every month, in major units
    pub mean: f64,
    /// Mean over months with a non-zero value, in major units (0 when none)
    pub mean_non_zero: f64,
}

impl ReportDataByPeriod {
    /// Compute statistics over `values`; `decimals` converts means to major units
    pub fn new(values: Vec<PeriodValue>, decimals: u32) -> Self {
        let amounts = || values.iter().map(|v| v.value);

        let min = amounts().min().unwrap_or_default();
        let max = amounts().max().unwrap_or_default();
        let abs_min = amounts().map(|m| m.abs()).min().unwrap_or_default();
        let abs_max = amounts().map(|m| m.abs()).max().unwrap_or_default();
        let sum: Money = amounts().sum();

        let mean = if values.is_empty() {
            0.0
        } else {
            sum.as_major(decimals) / values.len() as f64
        };
        let non_zero = amounts().filter(|m| !m.is_zero()).count();
        let mean_non_zero = if non_zero == 0 {
            0.0
        } else {
            sum.as_major(decimals) / non_zero as f64
        };

        Self {
            values,
            min,
            max,
            abs_min,
            abs_max,
            sum,
            mean,
            mean_non_zero,
        }
    }

    /// Data of a report with no values
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }
}

/// One plotted point
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodPoint {
    /// Axis label, e.g. "Mar 2024"
    pub label: String,
    pub value: Money,
    /// The aggregate this point was made from
    pub source: PeriodValue,
}

impl From<PeriodValue> for PeriodPoint {
    fn from(source: PeriodValue) -> Self {
        Self {
            label: source.month.label(),
            value: source.value,
            source,
        }
    }
}

/// Points of one rebuild and the statistics they came with
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportResult {
    pub points: Vec<PeriodPoint>,
    pub data: ReportDataByPeriod,
}

impl ReportResult {
    pub fn from_data(data: ReportDataByPeriod) -> Self {
        let points = data.values.iter().copied().map(PeriodPoint::from).collect();
        Self { points, data }
    }

    pub fn empty() -> Self {
        Self::from_data(ReportDataByPeriod::empty())
    }

    /// True iff at least one point is non-zero
    pub fn has_data_to_plot(&self) -> bool {
        self.points.iter().any(|p| !p.value.is_zero())
    }
}
