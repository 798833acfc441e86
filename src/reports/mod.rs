//! By-period reports
//!
//! A report shows, month by month, the amounts booked against one category,
//! account, payee, location or project. The navigator steps through those
//! entities and through time; the aggregator turns stored transactions into
//! per-month values.

pub mod aggregator;
pub mod data;
pub mod filter;
pub mod navigator;
pub mod period_length;

pub use aggregator::{DataAggregator, TransactionAggregator};
pub use data::{
    PeriodPoint, PeriodQuery, PeriodValue, ReportDataByPeriod, ReportResult, ReportWindow,
};
pub use filter::{EntityStore, FilterSet, FilterSource};
pub use navigator::PeriodReportNavigator;
pub use period_length::{
    clamp_period_length, default_start_period, is_valid_period_length, period_length_label,
    MAX_PERIOD_LENGTH, PERIOD_LENGTHS,
};
