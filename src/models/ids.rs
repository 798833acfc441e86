//! Strongly-typed ID wrappers
//!
//! Currencies and filterable entities are keyed by numeric ids (the report
//! filters and the currency cache address them by number); transactions get
//! random UUIDs so imported rows never collide.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Macro to generate numeric ID newtype wrappers
macro_rules! define_numeric_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw id
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the raw id
            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

define_numeric_id!(CurrencyId, "cur-");
define_numeric_id!(EntityId, "ent-");

/// Unique identifier of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Create a new random ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn-{}", &self.0.to_string()[..8])
    }
}

impl FromStr for TransactionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.strip_prefix("txn-").unwrap_or(s))?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_display_and_parse() {
        let id = CurrencyId::new(7);
        assert_eq!(id.to_string(), "cur-7");
        assert_eq!("cur-7".parse::<CurrencyId>().unwrap(), id);
        assert_eq!("7".parse::<CurrencyId>().unwrap(), id);
        assert!("seven".parse::<CurrencyId>().is_err());
    }

    #[test]
    fn test_numeric_id_serialization() {
        let id = EntityId::new(10);
        assert_eq!(serde_json::to_string(&id).unwrap(), "10");
        let back: EntityId = serde_json::from_str("10").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_transaction_id_display() {
        let id = TransactionId::new();
        let display = id.to_string();
        assert!(display.starts_with("txn-"));
        assert_eq!(display.len(), 12);
        assert_ne!(id, TransactionId::new());
    }

    #[test]
    fn test_transaction_id_parse() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id: TransactionId = uuid_str.parse().unwrap();
        assert_eq!(id.as_uuid().to_string(), uuid_str);
    }
}
