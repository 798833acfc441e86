//! Totals calculation
//!
//! Sums amounts per currency, either over the transactions a filter selects
//! or over the balances of every active account.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;

use crate::config::paths::TallyPaths;
use crate::error::TallyResult;
use crate::models::{Currency, CurrencyId, EntityId, EntityKind, Money, Transaction};
use crate::storage::Storage;

use super::runner::{BackgroundTask, Progress};

/// The sum of amounts in one currency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Total {
    pub currency: Currency,
    pub amount: Money,
}

/// Which transactions a total covers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TotalsFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Only transactions booked against this entity (categories include sub-categories)
    pub entity: Option<(EntityKind, EntityId)>,
}

impl TotalsFilter {
    pub fn between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn for_entity(mut self, kind: EntityKind, id: EntityId) -> Self {
        self.entity = Some((kind, id));
        self
    }

    fn matches(&self, txn: &Transaction, ids: &HashSet<EntityId>) -> bool {
        if self.from.is_some_and(|from| txn.date < from) || self.to.is_some_and(|to| txn.date > to) {
            return false;
        }
        match self.entity {
            Some((kind, _)) => txn.column_value(kind).is_some_and(|id| ids.contains(&id)),
            None => true,
        }
    }
}

/// What to total
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TotalsRequest {
    Transactions(TotalsFilter),
    AccountBalances,
}

/// Computes per-currency totals
#[derive(Debug, Clone)]
pub struct TotalsTask {
    paths: TallyPaths,
    request: TotalsRequest,
}

impl TotalsTask {
    pub fn new(paths: TallyPaths, request: TotalsRequest) -> Self {
        Self { paths, request }
    }
}

impl BackgroundTask for TotalsTask {
    type Output = Vec<Total>;

    fn name(&self) -> &'static str {
        "totals"
    }

    fn run(self, progress: &Progress) -> TallyResult<Vec<Total>> {
        progress.publish("Calculating totals");
        let storage = Storage::open(self.paths.clone())?;
        storage.load_all()?;
        calculate_totals(&storage, &self.request)
    }
}

/// Per-currency totals, ordered by currency id
///
/// Currencies without a matching transaction are left out.
pub fn calculate_totals(storage: &Storage, request: &TotalsRequest) -> TallyResult<Vec<Total>> {
    let transactions = storage.transactions.get_all()?;
    let mut sums: BTreeMap<CurrencyId, Money> = BTreeMap::new();

    match request {
        TotalsRequest::Transactions(filter) => {
            let ids = match filter.entity {
                Some((EntityKind::Category, id)) => storage.entities.descendants_of(id)?,
                Some((_, id)) => HashSet::from([id]),
                None => HashSet::new(),
            };
            for txn in transactions.iter().filter(|t| filter.matches(t, &ids)) {
                *sums.entry(txn.currency).or_insert_with(Money::zero) += txn.amount;
            }
        }
        TotalsRequest::AccountBalances => {
            let active: HashSet<EntityId> = storage
                .entities
                .list(EntityKind::Account)?
                .into_iter()
                .filter(|a| a.active)
                .map(|a| a.id)
                .collect();
            for txn in transactions.iter().filter(|t| active.contains(&t.account)) {
                *sums.entry(txn.currency).or_insert_with(Money::zero) += txn.amount;
            }
        }
    }

    sums.into_iter()
        .map(|(id, amount)| {
            let currency = storage.currencies.get(id)?.unwrap_or_else(Currency::empty);
            Ok(Total { currency, amount })
        })
        .collect()
}
