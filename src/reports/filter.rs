//! Report filters
//!
//! A by-period report shows one entity at a time: one category, one account,
//! one payee and so on. [`FilterSource`] says which kind of entity and how to
//! list them; [`FilterSet`] is the resulting list with a cursor.

use crate::error::TallyResult;
use crate::models::{EntityId, EntityKind};

/// Lists the entities reports filter on
pub trait EntityStore {
    /// Top-level entities of `kind`, ordered for display
    fn list_filter_entities(&self, kind: EntityKind) -> TallyResult<Vec<(EntityId, String)>>;

    /// Direct children of `parent`, ordered for display
    fn list_child_entities(
        &self,
        kind: EntityKind,
        parent: EntityId,
    ) -> TallyResult<Vec<(EntityId, String)>>;
}

/// Which entities a navigator steps through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSource {
    /// Top-level categories, or the sub-categories of `parent`
    Category { parent: Option<EntityId> },
    Account,
    Payee,
    Location,
    Project,
}

impl FilterSource {
    /// Root source for `kind`
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Category => Self::Category { parent: None },
            EntityKind::Account => Self::Account,
            EntityKind::Payee => Self::Payee,
            EntityKind::Location => Self::Location,
            EntityKind::Project => Self::Project,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Category { .. } => EntityKind::Category,
            Self::Account => EntityKind::Account,
            Self::Payee => EntityKind::Payee,
            Self::Location => EntityKind::Location,
            Self::Project => EntityKind::Project,
        }
    }

    /// Transaction column the filter ids refer to
    pub fn column(&self) -> &'static str {
        self.kind().column()
    }

    /// Name of the filter list, e.g. "Categories"
    pub fn filter_name(&self) -> &'static str {
        match self {
            Self::Category { parent: None } => "Categories",
            Self::Category { parent: Some(_) } => "Sub-categories",
            Self::Account => "Accounts",
            Self::Payee => "Payees",
            Self::Location => "Locations",
            Self::Project => "Projects",
        }
    }

    /// Shown when there is nothing to filter on
    pub fn no_filter_message(&self) -> &'static str {
        match self {
            Self::Category { parent: None } => "No categories to report on",
            Self::Category { parent: Some(_) } => "No sub-categories to report on",
            Self::Account => "No accounts to report on",
            Self::Payee => "No payees to report on",
            Self::Location => "No locations to report on",
            Self::Project => "No projects to report on",
        }
    }

    /// Build the filter list from `store`
    pub fn create_filter(&self, store: &dyn EntityStore) -> TallyResult<FilterSet> {
        let pairs = match self {
            Self::Category {
                parent: Some(parent),
            } => store.list_child_entities(EntityKind::Category, *parent)?,
            _ => store.list_filter_entities(self.kind())?,
        };
        Ok(FilterSet::from_pairs(self.kind(), pairs))
    }

    /// Source one level below `selected`, if the kind has a hierarchy
    pub fn children(&self, selected: EntityId) -> Option<FilterSource> {
        match self {
            Self::Category { .. } => Some(Self::Category {
                parent: Some(selected),
            }),
            _ => None,
        }
    }
}

/// Ordered filter entries with the index of the selected one
///
/// `ids` and `titles` always have the same length, and `current` is a valid
/// index whenever the set is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    kind: EntityKind,
    ids: Vec<EntityId>,
    titles: Vec<String>,
    current: usize,
}

impl FilterSet {
    pub fn from_pairs(kind: EntityKind, pairs: Vec<(EntityId, String)>) -> Self {
        let (ids, titles) = pairs.into_iter().unzip();
        Self {
            kind,
            ids,
            titles,
            current: 0,
        }
    }

    pub fn empty(kind: EntityKind) -> Self {
        Self::from_pairs(kind, Vec::new())
    }

    /// Transaction column the ids refer to
    pub fn column(&self) -> &'static str {
        self.kind.column()
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_id(&self) -> Option<EntityId> {
        self.ids.get(self.current).copied()
    }

    pub fn current_title(&self) -> Option<&str> {
        self.titles.get(self.current).map(String::as_str)
    }

    /// Id at `index`, `None` when out of range
    pub fn id_at(&self, index: usize) -> Option<EntityId> {
        self.ids.get(index).copied()
    }

    /// Index of the entry titled `title` (case-insensitive)
    pub fn position_of_title(&self, title: &str) -> Option<usize> {
        let title = title.trim().to_lowercase();
        self.titles.iter().position(|t| t.to_lowercase() == title)
    }

    pub(crate) fn select(&mut self, index: usize) {
        debug_assert!(index < self.ids.len());
        self.current = index;
    }
}
