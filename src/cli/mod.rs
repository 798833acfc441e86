//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with storage, reports and tasks.

pub mod currency;
pub mod data;
pub mod entity;
pub mod report;
pub mod transaction;

pub use currency::{handle_currency_command, CurrencyCommands};
pub use data::{handle_data_command, ConsoleListener, DataCommands};
pub use entity::{handle_entity_command, EntityCommands};
pub use report::{handle_report_command, ReportCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};
