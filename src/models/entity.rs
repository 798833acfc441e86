//! Filterable entities
//!
//! Categories, accounts, payees, locations and projects share one shape: an
//! id, a title, and a few kind-specific fields. Reports filter transactions by
//! one of them at a time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{CurrencyId, EntityId};

/// The kinds of entity a report can filter on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Category,
    Account,
    Payee,
    Location,
    Project,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Category,
        EntityKind::Account,
        EntityKind::Payee,
        EntityKind::Location,
        EntityKind::Project,
    ];

    /// Transaction column the kind filters on
    pub fn column(&self) -> &'static str {
        match self {
            Self::Category => "category_id",
            Self::Account => "from_account_id",
            Self::Payee => "payee_id",
            Self::Location => "location_id",
            Self::Project => "project_id",
        }
    }

    /// Display name of a single item
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Account => "Account",
            Self::Payee => "Payee",
            Self::Location => "Location",
            Self::Project => "Project",
        }
    }

    /// Kinds with a reserved id 0 ("current location", "no project")
    pub fn has_reserved_zero(&self) -> bool {
        matches!(self, Self::Location | Self::Project)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "category" | "categories" => Ok(Self::Category),
            "account" | "accounts" => Ok(Self::Account),
            "payee" | "payees" => Ok(Self::Payee),
            "location" | "locations" => Ok(Self::Location),
            "project" | "projects" => Ok(Self::Project),
            other => Err(format!("Unknown entity kind: {}", other)),
        }
    }
}

/// A category, account, payee, location or project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub title: String,

    /// Parent category, for sub-categories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<EntityId>,

    /// Currency an account is kept in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyId>,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Entity {
    /// Create an active top-level entity
    pub fn new(id: EntityId, kind: EntityKind, title: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            parent: None,
            currency: None,
            active: true,
        }
    }

    /// Builder-style parent assignment
    pub fn with_parent(mut self, parent: EntityId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Builder-style currency assignment
    pub fn with_currency(mut self, currency: CurrencyId) -> Self {
        self.currency = Some(currency);
        self
    }

    /// Validate the entity before it is stored
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err(format!("{} title cannot be empty", self.kind));
        }
        if self.parent.is_some() && self.kind != EntityKind::Category {
            return Err(format!("{} entries cannot have a parent", self.kind));
        }
        if self.parent == Some(self.id) {
            return Err(format!("{} cannot be its own parent", self.title));
        }
        Ok(())
    }
}
