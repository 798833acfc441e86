//! Core data models for Tally
//!
//! This module contains the data structures reports are built from:
//! currencies, filterable entities, transactions, amounts and months.

pub mod currency;
pub mod entity;
pub mod ids;
pub mod money;
pub mod month;
pub mod transaction;

pub use currency::Currency;
pub use entity::{Entity, EntityKind};
pub use ids::{CurrencyId, EntityId, TransactionId};
pub use money::{Money, MoneyParseError};
pub use month::{Month, MonthParseError};
pub use transaction::Transaction;
