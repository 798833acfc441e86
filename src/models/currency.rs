//! Currency model
//!
//! Separators and the number pattern are stored the way users configured
//! them; turning them into a formatter is the job of `currency::format`.

use serde::{Deserialize, Serialize};

use super::ids::CurrencyId;

/// A currency the user keeps amounts in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub id: CurrencyId,

    /// ISO-style code, e.g. "EUR"
    pub name: String,

    /// Human-readable title, e.g. "Euro"
    #[serde(default)]
    pub title: String,

    pub symbol: String,

    /// Number of fraction digits amounts are kept with
    #[serde(default = "default_decimals")]
    pub decimals: u32,

    /// Stored decimal separator, quoted (e.g. `"','"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal_separator: Option<String>,

    /// Stored grouping separator, quoted (e.g. `"' '"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_separator: Option<String>,

    /// Custom number pattern, e.g. `#,##,##0.00`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,

    #[serde(default)]
    pub is_default: bool,
}

/// Most fraction digits a currency can be kept with
pub const MAX_DECIMALS: u32 = 6;

fn default_decimals() -> u32 {
    2
}

impl Currency {
    /// Id reserved for the empty sentinel
    pub const EMPTY_ID: CurrencyId = CurrencyId::new(0);

    /// Create a currency with default formatting
    pub fn new(id: CurrencyId, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            title: name.clone(),
            name,
            symbol: symbol.into(),
            decimals: default_decimals(),
            decimal_separator: None,
            group_separator: None,
            number_format: None,
            is_default: false,
        }
    }

    /// Sentinel standing in for an unknown currency id
    pub fn empty() -> Self {
        Self {
            id: Self::EMPTY_ID,
            name: String::new(),
            title: String::new(),
            symbol: String::new(),
            decimals: default_decimals(),
            decimal_separator: None,
            group_separator: None,
            number_format: None,
            is_default: false,
        }
    }

    /// Check if this is the empty sentinel
    pub fn is_empty(&self) -> bool {
        self.id == Self::EMPTY_ID
    }

    /// Validate a currency before it is stored
    pub fn validate(&self) -> Result<(), String> {
        if self.is_empty() {
            return Err("Currency id 0 is reserved".into());
        }
        if self.name.trim().is_empty() {
            return Err("Currency name cannot be empty".into());
        }
        if self.decimals > MAX_DECIMALS {
            return Err(format!(
                "Currency {} cannot have {} decimal places",
                self.name, self.decimals
            ));
        }
        Ok(())
    }
}
