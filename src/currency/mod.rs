//! Currency lookup and formatting
//!
//! Report and listing code resolves currencies through a [`CurrencyCache`]
//! created once at startup and passed by reference; the cache reads through to
//! a [`CurrencyStore`] on a miss.

pub mod cache;
pub mod format;

pub use cache::CurrencyCache;
pub use format::{create_currency_format, CurrencyFormat, DEFAULT_NUMBER_FORMAT};

use crate::error::TallyResult;
use crate::models::{Currency, CurrencyId};

/// Where currency records come from
pub trait CurrencyStore {
    /// Every stored currency
    fn query_all(&self) -> TallyResult<Vec<Currency>>;

    /// One currency, or `None` when the id is unknown
    fn query_by_id(&self, id: CurrencyId) -> TallyResult<Option<Currency>>;
}
