//! Aggregation of transactions into per-month values

use std::collections::HashSet;

use tracing::debug;

use crate::error::TallyResult;
use crate::models::{EntityId, EntityKind, Money, Month};
use crate::storage::Storage;

use super::data::{PeriodQuery, PeriodValue, ReportDataByPeriod};
use super::period_length::clamp_period_length;

/// Produces the per-month values of one report window
pub trait DataAggregator {
    fn aggregate(&self, query: &PeriodQuery) -> TallyResult<ReportDataByPeriod>;
}

/// Sums stored transactions per month
///
/// Only transactions in the query currency count. A category matches its own
/// transactions and those of every sub-category below it.
pub struct TransactionAggregator<'a> {
    storage: &'a Storage,
}

impl<'a> TransactionAggregator<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn matching_ids(&self, query: &PeriodQuery) -> TallyResult<HashSet<EntityId>> {
        match query.kind {
            EntityKind::Category => self.storage.entities.descendants_of(query.entity),
            _ => Ok(HashSet::from([query.entity])),
        }
    }
}

impl DataAggregator for TransactionAggregator<'_> {
    fn aggregate(&self, query: &PeriodQuery) -> TallyResult<ReportDataByPeriod> {
        let length = clamp_period_length(query.length);
        let end = query.start.add_months(i64::from(length) - 1);
        let ids = self.matching_ids(query)?;

        let mut sums = vec![Money::zero(); length as usize];
        let transactions = self
            .storage
            .transactions
            .get_in_range(query.start.first_day(), end.last_day())?;

        let mut matched = 0usize;
        for txn in transactions
            .iter()
            .filter(|t| t.currency == query.currency.id)
            .filter(|t| t.column_value(query.kind).is_some_and(|id| ids.contains(&id)))
        {
            let offset = query.start.months_until(Month::from_date(txn.date));
            if let Some(slot) = usize::try_from(offset).ok().and_then(|i| sums.get_mut(i)) {
                *slot += txn.amount;
                matched += 1;
            }
        }

        debug!(
            column = query.column(),
            entity = %query.entity,
            start = %query.start,
            length,
            matched,
            "Aggregated transactions"
        );

        let values = sums
            .into_iter()
            .enumerate()
            .map(|(i, value)| PeriodValue {
                month: query.start.add_months(i as i64),
                value,
            })
            .collect();
        Ok(ReportDataByPeriod::new(values, query.currency.decimals))
    }
}
