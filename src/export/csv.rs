//! CSV export and import of transactions
//!
//! Rows name their account, category, payee, location, project and currency
//! by title, so a file can be edited by hand and imported into another data
//! directory. Importing creates the entities a row names but that do not exist
//! yet; currencies must already exist.

use std::collections::HashMap;
use std::io::{Read, Write};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TallyError, TallyResult};
use crate::models::{Currency, Entity, EntityId, EntityKind, Money, Transaction};
use crate::storage::Storage;

/// One CSV row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Account")]
    pub account: String,
    #[serde(rename = "Category", default)]
    pub category: String,
    #[serde(rename = "Payee", default)]
    pub payee: String,
    #[serde(rename = "Location", default)]
    pub location: String,
    #[serde(rename = "Project", default)]
    pub project: String,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "Note", default)]
    pub note: String,
}

/// Result of an import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub created_entities: usize,
}

/// Export all transactions to CSV, oldest first
///
/// Returns the number of rows written.
pub fn export_transactions_csv<W: Write>(storage: &Storage, writer: W) -> TallyResult<usize> {
    let titles: HashMap<EntityId, String> = EntityKind::ALL
        .iter()
        .map(|kind| storage.entities.list(*kind))
        .collect::<TallyResult<Vec<_>>>()?
        .into_iter()
        .flatten()
        .map(|e| (e.id, e.title))
        .collect();
    let currencies: HashMap<_, Currency> = storage
        .currencies
        .get_all()?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let title_of = |id: Option<EntityId>| {
        id.and_then(|id| titles.get(&id).cloned())
            .unwrap_or_default()
    };

    let mut transactions = storage.transactions.get_all()?;
    transactions.reverse();

    let mut csv_writer = csv::Writer::from_writer(writer);
    for txn in &transactions {
        let currency = currencies
            .get(&txn.currency)
            .cloned()
            .unwrap_or_else(Currency::empty);
        let row = TransactionRow {
            date: txn.date.to_string(),
            account: title_of(Some(txn.account)),
            category: title_of(txn.category),
            payee: title_of(txn.payee),
            location: title_of(txn.location),
            project: title_of(txn.project),
            currency: currency.name.clone(),
            amount: txn.amount.to_decimal_string(currency.decimals),
            note: txn.note.clone(),
        };
        csv_writer
            .serialize(&row)
            .map_err(|e| TallyError::Export(e.to_string()))?;
    }
    csv_writer
        .flush()
        .map_err(|e| TallyError::Export(e.to_string()))?;

    Ok(transactions.len())
}

/// Import transactions from CSV into `storage`
///
/// Every row is checked before anything is stored; a bad row fails the whole
/// import with its line number. The caller saves the storage.
pub fn import_transactions_csv<R: Read>(
    storage: &Storage,
    reader: R,
    date_format: &str,
) -> TallyResult<ImportSummary> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut rows = Vec::new();
    for (i, record) in csv_reader.deserialize::<TransactionRow>().enumerate() {
        // Line 1 is the header
        let line = i + 2;
        let row = record.map_err(|e| TallyError::Import(format!("line {}: {}", line, e)))?;
        rows.push((line, row));
    }

    let mut parsed = Vec::with_capacity(rows.len());
    for (line, row) in &rows {
        let date = parse_date(&row.date, date_format)
            .ok_or_else(|| TallyError::Import(format!("line {}: invalid date '{}'", line, row.date)))?;
        let currency = storage.currencies.get_by_name(&row.currency)?.ok_or_else(|| {
            TallyError::Import(format!("line {}: unknown currency '{}'", line, row.currency))
        })?;
        let amount = Money::parse(&row.amount, currency.decimals).map_err(|e| {
            TallyError::Import(format!("line {}: {}", line, e))
        })?;
        if row.account.is_empty() {
            return Err(TallyError::Import(format!("line {}: account is required", line)));
        }
        parsed.push((row, date, currency, amount));
    }

    let mut summary = ImportSummary::default();
    for (row, date, currency, amount) in parsed {
        let account = resolve(storage, EntityKind::Account, &row.account, &mut summary)?
            .ok_or_else(|| TallyError::Import("account is required".into()))?;
        let mut txn = Transaction::new(account, date, currency.id, amount);
        txn.category = resolve(storage, EntityKind::Category, &row.category, &mut summary)?;
        txn.payee = resolve(storage, EntityKind::Payee, &row.payee, &mut summary)?;
        txn.location = resolve(storage, EntityKind::Location, &row.location, &mut summary)?;
        txn.project = resolve(storage, EntityKind::Project, &row.project, &mut summary)?;
        txn.note = row.note.clone();
        storage.transactions.upsert(txn)?;
        summary.imported += 1;
    }

    debug!(
        imported = summary.imported,
        created = summary.created_entities,
        "Imported transactions from CSV"
    );
    Ok(summary)
}

fn parse_date(text: &str, date_format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, date_format)
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .ok()
}

/// Id of the entity titled `title`, created when missing; `None` for a blank title
fn resolve(
    storage: &Storage,
    kind: EntityKind,
    title: &str,
    summary: &mut ImportSummary,
) -> TallyResult<Option<EntityId>> {
    if title.is_empty() {
        return Ok(None);
    }
    if let Some(existing) = storage.entities.get_by_title(kind, title)? {
        return Ok(Some(existing.id));
    }

    let id = storage.entities.next_id()?;
    storage.entities.upsert(Entity::new(id, kind, title))?;
    summary.created_entities += 1;
    Ok(Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TallyPaths;
    use crate::models::CurrencyId;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        storage
            .currencies
            .upsert(Currency::new(CurrencyId::new(1), "EUR", "€"))
            .unwrap();
        (temp_dir, storage)
    }

    const SAMPLE: &str = "\
Date,Account,Category,Payee,Location,Project,Currency,Amount,Note
2024-01-05,Checking,Food,Market,,,EUR,-12.50,weekly shop
2024-01-06,Checking,Food,,,,EUR,-3.00,
2024-01-31,Checking,Salary,Employer,,,EUR,2500,
";

    #[test]
    fn test_import_creates_entities() {
        let (_temp_dir, storage) = create_test_storage();
        let summary = import_transactions_csv(&storage, SAMPLE.as_bytes(), "%Y-%m-%d").unwrap();

        assert_eq!(summary.imported, 3);
        // Checking, Food, Market, Salary, Employer
        assert_eq!(summary.created_entities, 5);
        assert_eq!(storage.transactions.count().unwrap(), 3);

        let food = storage
            .entities
            .get_by_title(EntityKind::Category, "Food")
            .unwrap()
            .unwrap();
        let txns = storage.transactions.get_all().unwrap();
        assert_eq!(
            txns.iter().filter(|t| t.category == Some(food.id)).count(),
            2
        );
        assert!(txns.iter().any(|t| t.amount == Money::from_minor(250000)));
    }

    #[test]
    fn test_bad_row_imports_nothing() {
        let (_temp_dir, storage) = create_test_storage();
        let data = "\
Date,Account,Category,Payee,Location,Project,Currency,Amount,Note
2024-01-05,Checking,Food,,,,EUR,-12.50,
2024-01-06,Checking,Food,,,,XYZ,-3.00,
";
        let err = import_transactions_csv(&storage, data.as_bytes(), "%Y-%m-%d").unwrap_err();
        assert!(err.to_string().contains("line 3"));
        assert_eq!(storage.transactions.count().unwrap(), 0);
        assert_eq!(storage.entities.count().unwrap(), 0);
    }

    #[test]
    fn test_export_then_import_elsewhere() {
        let (_temp_dir, storage) = create_test_storage();
        import_transactions_csv(&storage, SAMPLE.as_bytes(), "%Y-%m-%d").unwrap();

        let mut out = Vec::new();
        let written = export_transactions_csv(&storage, &mut out).unwrap();
        assert_eq!(written, 3);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Date,Account,Category"));
        assert!(text.contains("2024-01-05,Checking,Food,Market,,,EUR,-12.50,weekly shop"));

        let (_other_dir, other) = create_test_storage();
        let summary = import_transactions_csv(&other, text.as_bytes(), "%d/%m/%Y").unwrap();
        assert_eq!(summary.imported, 3);
    }

    #[test]
    fn test_custom_date_format() {
        let (_temp_dir, storage) = create_test_storage();
        let data = "\
Date,Account,Category,Payee,Location,Project,Currency,Amount,Note
31/01/2024,Checking,,,,,EUR,1.00,
";
        import_transactions_csv(&storage, data.as_bytes(), "%d/%m/%Y").unwrap();
        let txn = &storage.transactions.get_all().unwrap()[0];
        assert_eq!(txn.date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(txn.category, None);
    }
}
