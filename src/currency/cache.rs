//! Read-through currency cache
//!
//! Every read and write goes through one mutex. The map only ever gains or
//! replaces whole entries, so a guard recovered from a poisoned lock still
//! sees consistent data.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::error::TallyResult;
use crate::models::{Currency, CurrencyId};

use super::CurrencyStore;

/// Cache from currency id to currency record, without eviction
#[derive(Debug, Default)]
pub struct CurrencyCache {
    currencies: Mutex<HashMap<CurrencyId, Currency>>,
}

impl CurrencyCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CurrencyId, Currency>> {
        self.currencies.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up `id`, querying `store` on a miss
    ///
    /// An id the store does not know is cached as the empty currency, so it is
    /// never queried again. Store failures are returned and cache nothing.
    pub fn get_currency(&self, store: &dyn CurrencyStore, id: CurrencyId) -> TallyResult<Currency> {
        let mut currencies = self.lock();
        if let Some(currency) = currencies.get(&id) {
            return Ok(currency.clone());
        }

        debug!(currency = %id, "Currency cache miss");
        let currency = store.query_by_id(id)?.unwrap_or_else(Currency::empty);
        currencies.insert(id, currency.clone());
        Ok(currency)
    }

    /// Look up `id` in the cache only, falling back to the empty currency
    pub fn get_currency_or_empty(&self, id: CurrencyId) -> Currency {
        self.lock().get(&id).cloned().unwrap_or_else(Currency::empty)
    }

    /// Load every currency from `store`, merging over what is cached
    ///
    /// Returns the number of currencies loaded.
    pub fn initialize(&self, store: &dyn CurrencyStore) -> TallyResult<usize> {
        let loaded = store.query_all()?;
        let count = loaded.len();

        let mut currencies = self.lock();
        currencies.extend(loaded.into_iter().map(|c| (c.id, c)));
        info!(count, "Currency cache initialized");
        Ok(count)
    }

    /// Snapshot of the cached currencies, ordered by id
    pub fn get_all_currencies(&self) -> Vec<Currency> {
        let mut all: Vec<_> = self.lock().values().cloned().collect();
        all.sort_by_key(|c| c.id);
        all
    }

    /// Number of cached entries, sentinels included
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
