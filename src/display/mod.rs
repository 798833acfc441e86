//! Display formatting for terminal output
//!
//! Provides utilities for rendering reports and totals as text, tables and
//! export documents.

pub mod report;

pub use report::{
    format_bar, format_period_report, format_period_table, format_totals, separator, write_report,
    ReportExport, ReportFormat,
};
