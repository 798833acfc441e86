//! Tally - period reports, currency formatting and data tasks for personal finances
//!
//! This library provides the core functionality of the Tally application:
//! month-by-month reports over categories, accounts, payees, locations and
//! projects, currency lookup and number formatting, and background data tasks
//! (backup, restore, CSV import/export, totals) with optional cloud uploads.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `logging`: Tracing subscriber setup
//! - `models`: Core data models (currencies, entities, transactions, months)
//! - `storage`: JSON file storage layer
//! - `currency`: Currency cache and number formatting
//! - `reports`: The period report navigator and data aggregation
//! - `tasks`: Background tasks and their outcomes
//! - `export`: JSON backup and CSV transaction export/import
//! - `display`: Terminal rendering of reports
//! - `cli`: clap subcommands
//!
//! # Example
//!
//! ```rust,ignore
//! use tally::config::{paths::TallyPaths, settings::Settings};
//!
//! let paths = TallyPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod cli;
pub mod config;
pub mod currency;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod reports;
pub mod storage;
pub mod tasks;

pub use error::{TallyError, TallyResult};
