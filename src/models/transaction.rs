//! Transaction model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity::EntityKind;
use super::ids::{CurrencyId, EntityId, TransactionId};
use super::money::Money;

/// A single money movement on an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub date: NaiveDate,
    pub account: EntityId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<EntityId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee: Option<EntityId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<EntityId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<EntityId>,

    pub currency: CurrencyId,

    /// Signed amount, negative for outflow
    pub amount: Money,

    #[serde(default)]
    pub note: String,
}

impl Transaction {
    /// Create an uncategorized transaction
    pub fn new(account: EntityId, date: NaiveDate, currency: CurrencyId, amount: Money) -> Self {
        Self {
            id: TransactionId::new(),
            date,
            account,
            category: None,
            payee: None,
            location: None,
            project: None,
            currency,
            amount,
            note: String::new(),
        }
    }

    /// Value of the column a report of `kind` filters on
    pub fn column_value(&self, kind: EntityKind) -> Option<EntityId> {
        match kind {
            EntityKind::Category => self.category,
            EntityKind::Account => Some(self.account),
            EntityKind::Payee => self.payee,
            EntityKind::Location => self.location,
            EntityKind::Project => self.project,
        }
    }

    /// Set the column a report of `kind` filters on
    pub fn set_column_value(&mut self, kind: EntityKind, id: EntityId) {
        match kind {
            EntityKind::Category => self.category = Some(id),
            EntityKind::Account => self.account = id,
            EntityKind::Payee => self.payee = Some(id),
            EntityKind::Location => self.location = Some(id),
            EntityKind::Project => self.project = Some(id),
        }
    }
}
