//! Export module for Tally
//!
//! Provides complete data export functionality in two formats:
//! - JSON: full database backup, restorable
//! - CSV: transactions with entities named by title (spreadsheet-compatible)

pub mod csv;
pub mod json;

pub use self::csv::{export_transactions_csv, import_transactions_csv, ImportSummary, TransactionRow};
pub use json::{export_full_json, import_from_json, FullExport, EXPORT_SCHEMA_VERSION};
