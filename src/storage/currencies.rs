//! Currency repository for JSON storage
//!
//! Manages loading and saving currencies to currencies.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::TallyError;
use crate::models::{Currency, CurrencyId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable currency data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct CurrencyData {
    currencies: Vec<Currency>,
}

/// Repository for currency persistence
pub struct CurrencyRepository {
    path: PathBuf,
    data: RwLock<HashMap<CurrencyId, Currency>>,
}

impl CurrencyRepository {
    /// Create a new currency repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load currencies from disk
    pub fn load(&self) -> Result<(), TallyError> {
        let file_data: CurrencyData = read_json(&self.path)?;
        self.replace_all(file_data.currencies)
    }

    /// Save currencies to disk
    pub fn save(&self) -> Result<(), TallyError> {
        let currencies = self.get_all()?;
        write_json_atomic(&self.path, &CurrencyData { currencies })
    }

    /// Replace the in-memory contents
    pub fn replace_all(&self, currencies: Vec<Currency>) -> Result<(), TallyError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for currency in currencies {
            data.insert(currency.id, currency);
        }
        Ok(())
    }

    /// Get a currency by ID
    pub fn get(&self, id: CurrencyId) -> Result<Option<Currency>, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get a currency by its code (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Result<Option<Currency>, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
            .cloned())
    }

    /// Get all currencies ordered by id
    pub fn get_all(&self) -> Result<Vec<Currency>, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut currencies: Vec<_> = data.values().cloned().collect();
        currencies.sort_by_key(|c| c.id);
        Ok(currencies)
    }

    /// Next free id
    pub fn next_id(&self) -> Result<CurrencyId, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let max = data.keys().map(|id| id.get()).max().unwrap_or(0);
        Ok(CurrencyId::new(max + 1))
    }

    /// Insert or update a currency
    pub fn upsert(&self, currency: Currency) -> Result<(), TallyError> {
        currency.validate().map_err(TallyError::Validation)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(currency.id, currency);
        Ok(())
    }

    /// Count currencies
    pub fn count(&self) -> Result<usize, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.len())
    }
}
