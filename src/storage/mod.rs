//! Storage layer for Tally
//!
//! Provides JSON file storage with atomic writes and automatic directory
//! creation, and implements the lookup boundaries the currency cache and the
//! report navigator consume.

pub mod currencies;
pub mod entities;
pub mod file_io;
pub mod init;
pub mod transactions;

pub use currencies::CurrencyRepository;
pub use entities::EntityRepository;
pub use file_io::{read_json, read_json_required, write_json_atomic};
pub use init::initialize_storage;
pub use transactions::TransactionRepository;

use crate::config::paths::TallyPaths;
use crate::currency::CurrencyStore;
use crate::error::{TallyError, TallyResult};
use crate::models::{Currency, CurrencyId, Entity, EntityId, EntityKind, Transaction};
use crate::reports::EntityStore;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: TallyPaths,
    pub currencies: CurrencyRepository,
    pub entities: EntityRepository,
    pub transactions: TransactionRepository,
}

impl Storage {
    /// Open storage rooted at `paths`, creating directories as needed
    pub fn open(paths: TallyPaths) -> Result<Self, TallyError> {
        paths.ensure_directories()?;

        Ok(Self {
            currencies: CurrencyRepository::new(paths.currencies_file()),
            entities: EntityRepository::new(paths.entities_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &TallyPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), TallyError> {
        self.currencies.load()?;
        self.entities.load()?;
        self.transactions.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), TallyError> {
        self.currencies.save()?;
        self.entities.save()?;
        self.transactions.save()?;
        Ok(())
    }

    /// Replace everything held in memory, as a restore does
    pub fn replace_all(
        &self,
        currencies: Vec<Currency>,
        entities: Vec<Entity>,
        transactions: Vec<Transaction>,
    ) -> Result<(), TallyError> {
        self.currencies.replace_all(currencies)?;
        self.entities.replace_all(entities)?;
        self.transactions.replace_all(transactions)?;
        Ok(())
    }
}

impl CurrencyStore for Storage {
    fn query_all(&self) -> TallyResult<Vec<Currency>> {
        self.currencies.get_all()
    }

    fn query_by_id(&self, id: CurrencyId) -> TallyResult<Option<Currency>> {
        self.currencies.get(id)
    }
}

impl EntityStore for Storage {
    fn list_filter_entities(&self, kind: EntityKind) -> TallyResult<Vec<(EntityId, String)>> {
        Ok(self
            .entities
            .top_level(kind)?
            .into_iter()
            .map(|e| (e.id, e.title))
            .collect())
    }

    fn list_child_entities(
        &self,
        kind: EntityKind,
        parent: EntityId,
    ) -> TallyResult<Vec<(EntityId, String)>> {
        Ok(self
            .entities
            .children(kind, parent)?
            .into_iter()
            .map(|e| (e.id, e.title))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert!(temp_dir.path().join("backups").exists());
        assert_eq!(storage.currencies.count().unwrap(), 0);
    }

    #[test]
    fn test_entity_store_lists_pairs() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();

        storage
            .entities
            .upsert(Entity::new(EntityId::new(11), EntityKind::Category, "Rent"))
            .unwrap();
        storage
            .entities
            .upsert(Entity::new(EntityId::new(10), EntityKind::Category, "Food"))
            .unwrap();

        let pairs = storage.list_filter_entities(EntityKind::Category).unwrap();
        assert_eq!(
            pairs,
            vec![
                (EntityId::new(10), "Food".to_string()),
                (EntityId::new(11), "Rent".to_string()),
            ]
        );
    }

    #[test]
    fn test_currency_store_lookup() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        storage
            .currencies
            .upsert(Currency::new(CurrencyId::new(1), "EUR", "€"))
            .unwrap();

        assert!(storage.query_by_id(CurrencyId::new(1)).unwrap().is_some());
        assert!(storage.query_by_id(CurrencyId::new(7)).unwrap().is_none());
        assert_eq!(storage.query_all().unwrap().len(), 1);
    }
}
