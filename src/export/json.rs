//! JSON backup
//!
//! Writes the complete database to one JSON document with a schema version,
//! and reads it back for a restore.

use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TallyError, TallyResult};
use crate::models::{Currency, Entity, EntityKind, Transaction};
use crate::storage::Storage;

/// Current backup schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full database export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub currencies: Vec<Currency>,
    pub entities: Vec<Entity>,
    pub transactions: Vec<Transaction>,

    pub metadata: ExportMetadata,
}

/// Export metadata for reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub currency_count: usize,
    pub entity_count: usize,
    pub transaction_count: usize,

    /// Date range of transactions (earliest)
    pub earliest_transaction: Option<String>,

    /// Date range of transactions (latest)
    pub latest_transaction: Option<String>,
}

impl FullExport {
    /// Create a new full export from storage
    pub fn from_storage(storage: &Storage) -> TallyResult<Self> {
        let currencies = storage.currencies.get_all()?;
        let mut entities = Vec::new();
        for kind in EntityKind::ALL {
            entities.extend(storage.entities.list(kind)?);
        }
        entities.sort_by_key(|e| e.id);
        let transactions = storage.transactions.get_all()?;

        let metadata = ExportMetadata {
            currency_count: currencies.len(),
            entity_count: entities.len(),
            transaction_count: transactions.len(),
            earliest_transaction: transactions.iter().map(|t| t.date).min().map(|d| d.to_string()),
            latest_transaction: transactions.iter().map(|t| t.date).max().map(|d| d.to_string()),
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            currencies,
            entities,
            transactions,
            metadata,
        })
    }

    /// Validate the export structure
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        for currency in &self.currencies {
            currency.validate()?;
        }
        for entity in &self.entities {
            entity.validate()?;
        }

        let currency_ids: HashSet<_> = self.currencies.iter().map(|c| c.id).collect();
        let entity_ids: HashSet<_> = self.entities.iter().map(|e| e.id).collect();

        for entity in &self.entities {
            if let Some(parent) = entity.parent {
                if !entity_ids.contains(&parent) {
                    return Err(format!(
                        "{} {} references unknown parent {}",
                        entity.kind, entity.id, parent
                    ));
                }
            }
        }

        for txn in &self.transactions {
            if !currency_ids.contains(&txn.currency) {
                return Err(format!(
                    "Transaction {} references unknown currency {}",
                    txn.id, txn.currency
                ));
            }
            if !entity_ids.contains(&txn.account) {
                return Err(format!(
                    "Transaction {} references unknown account {}",
                    txn.id, txn.account
                ));
            }
        }

        Ok(())
    }

    /// Replace the contents of `storage` with this export and save it
    pub fn restore_into(self, storage: &Storage) -> TallyResult<()> {
        storage.replace_all(self.currencies, self.entities, self.transactions)?;
        storage.save_all()
    }
}

/// Export the full database to JSON
pub fn export_full_json<W: Write>(storage: &Storage, writer: &mut W, pretty: bool) -> TallyResult<()> {
    let export = FullExport::from_storage(storage)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| TallyError::Export(e.to_string()))?;

    Ok(())
}

/// Parse and validate a JSON export
pub fn import_from_json(json_str: &str) -> TallyResult<FullExport> {
    let export: FullExport =
        serde_json::from_str(json_str).map_err(|e| TallyError::Import(e.to_string()))?;

    export.validate().map_err(TallyError::Import)?;

    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TallyPaths;
    use crate::models::{CurrencyId, EntityId, Money};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn seed(storage: &Storage) {
        storage
            .currencies
            .upsert(Currency::new(CurrencyId::new(1), "EUR", "€"))
            .unwrap();
        storage
            .entities
            .upsert(Entity::new(EntityId::new(1), EntityKind::Account, "Checking"))
            .unwrap();
        storage
            .entities
            .upsert(Entity::new(EntityId::new(10), EntityKind::Category, "Food"))
            .unwrap();
        let mut txn = Transaction::new(
            EntityId::new(1),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            CurrencyId::new(1),
            Money::from_minor(-5000),
        );
        txn.category = Some(EntityId::new(10));
        storage.transactions.upsert(txn).unwrap();
    }

    #[test]
    fn test_full_export() {
        let (_temp_dir, storage) = create_test_storage();
        seed(&storage);

        let export = FullExport::from_storage(&storage).unwrap();
        assert_eq!(export.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(export.metadata.entity_count, 2);
        assert_eq!(export.metadata.transaction_count, 1);
        assert_eq!(export.metadata.earliest_transaction.as_deref(), Some("2024-01-15"));
        assert!(export.validate().is_ok());
    }

    #[test]
    fn test_restore_into_other_storage() {
        let (_temp_dir, storage) = create_test_storage();
        seed(&storage);

        let mut json_output = Vec::new();
        export_full_json(&storage, &mut json_output, true).unwrap();
        let imported = import_from_json(&String::from_utf8(json_output).unwrap()).unwrap();

        let (_other_dir, other) = create_test_storage();
        imported.restore_into(&other).unwrap();
        assert_eq!(other.transactions.count().unwrap(), 1);
        assert_eq!(other.currencies.count().unwrap(), 1);
        assert!(other.paths().transactions_file().exists());
    }

    #[test]
    fn test_validate_rejects_dangling_currency() {
        let (_temp_dir, storage) = create_test_storage();
        seed(&storage);
        let mut export = FullExport::from_storage(&storage).unwrap();
        export.currencies.clear();
        assert!(export.validate().unwrap_err().contains("unknown currency"));
    }

    #[test]
    fn test_import_rejects_invalid_records() {
        let (_temp_dir, storage) = create_test_storage();
        seed(&storage);

        let mut export = FullExport::from_storage(&storage).unwrap();
        export.currencies[0].decimals = 25;
        let json = serde_json::to_string(&export).unwrap();
        let err = import_from_json(&json).unwrap_err();
        assert!(matches!(err, TallyError::Import(_)));
        assert!(err.to_string().contains("cannot have 25 decimal places"));

        let mut export = FullExport::from_storage(&storage).unwrap();
        export.entities[0].title = "  ".into();
        assert!(export.validate().unwrap_err().contains("title cannot be empty"));
    }

    #[test]
    fn test_import_rejects_garbage() {
        let err = import_from_json("{\"not\": \"a backup\"}").unwrap_err();
        assert!(matches!(err, TallyError::Import(_)));
    }
}
