//! Transaction repository for JSON storage
//!
//! Manages loading and saving transactions to transactions.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;

use crate::error::TallyError;
use crate::models::{EntityId, Transaction, TransactionId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable transaction data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

/// Repository for transaction persistence with an account index
pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<HashMap<TransactionId, Transaction>>,
    /// Index: account -> transaction ids
    by_account: RwLock<HashMap<EntityId, Vec<TransactionId>>>,
}

impl TransactionRepository {
    /// Create a new transaction repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_account: RwLock::new(HashMap::new()),
        }
    }

    /// Load transactions from disk and build the index
    pub fn load(&self) -> Result<(), TallyError> {
        let file_data: TransactionData = read_json(&self.path)?;
        self.replace_all(file_data.transactions)
    }

    /// Save transactions to disk, newest first
    pub fn save(&self) -> Result<(), TallyError> {
        let transactions = self.get_all()?;
        write_json_atomic(&self.path, &TransactionData { transactions })
    }

    /// Replace the in-memory contents and rebuild the index
    pub fn replace_all(&self, transactions: Vec<Transaction>) -> Result<(), TallyError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_account = self
            .by_account
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        by_account.clear();

        for txn in transactions {
            by_account.entry(txn.account).or_default().push(txn.id);
            data.insert(txn.id, txn);
        }
        Ok(())
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> Result<Option<Transaction>, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get all transactions, newest first
    pub fn get_all(&self) -> Result<Vec<Transaction>, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut transactions: Vec<_> = data.values().cloned().collect();
        sort_newest_first(&mut transactions);
        Ok(transactions)
    }

    /// Get transactions for an account, newest first
    pub fn get_by_account(&self, account: EntityId) -> Result<Vec<Transaction>, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let by_account = self
            .by_account
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let ids = by_account.get(&account).map(|v| v.as_slice()).unwrap_or(&[]);
        let mut transactions: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        sort_newest_first(&mut transactions);
        Ok(transactions)
    }

    /// Get transactions dated within `[from, to]`, oldest first
    pub fn get_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Transaction>, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut transactions: Vec<_> = data
            .values()
            .filter(|t| t.date >= from && t.date <= to)
            .cloned()
            .collect();
        transactions.sort_by_key(|t| t.date);
        Ok(transactions)
    }

    /// Insert or update a transaction
    pub fn upsert(&self, txn: Transaction) -> Result<(), TallyError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_account = self
            .by_account
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if let Some(old) = data.get(&txn.id) {
            if let Some(ids) = by_account.get_mut(&old.account) {
                ids.retain(|id| *id != txn.id);
            }
        }

        by_account.entry(txn.account).or_default().push(txn.id);
        data.insert(txn.id, txn);
        Ok(())
    }

    /// Count transactions
    pub fn count(&self) -> Result<usize, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.len())
    }
}

fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CurrencyId, Money};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, TransactionRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        (temp_dir, repo)
    }

    fn txn(account: i64, y: i32, m: u32, d: u32, minor: i64) -> Transaction {
        Transaction::new(
            EntityId::new(account),
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            CurrencyId::new(1),
            Money::from_minor(minor),
        )
    }

    #[test]
    fn test_get_by_account_follows_updates() {
        let (_temp_dir, repo) = create_test_repo();
        let mut t = txn(1, 2024, 1, 5, -500);
        repo.upsert(t.clone()).unwrap();
        assert_eq!(repo.get_by_account(EntityId::new(1)).unwrap().len(), 1);

        t.account = EntityId::new(2);
        repo.upsert(t).unwrap();
        assert!(repo.get_by_account(EntityId::new(1)).unwrap().is_empty());
        assert_eq!(repo.get_by_account(EntityId::new(2)).unwrap().len(), 1);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_get_in_range_is_inclusive() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(txn(1, 2024, 1, 31, 100)).unwrap();
        repo.upsert(txn(1, 2024, 2, 1, 200)).unwrap();
        repo.upsert(txn(1, 2024, 2, 29, 300)).unwrap();
        repo.upsert(txn(1, 2024, 3, 1, 400)).unwrap();

        let feb = repo
            .get_in_range(
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            )
            .unwrap();
        let amounts: Vec<_> = feb.iter().map(|t| t.amount.minor()).collect();
        assert_eq!(amounts, vec![200, 300]);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.upsert(txn(1, 2024, 1, 5, -500)).unwrap();
        repo.upsert(txn(1, 2024, 3, 5, -700)).unwrap();
        repo.save().unwrap();

        let repo2 = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        repo2.load().unwrap();
        let all = repo2.get_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].amount.minor(), -700);
    }
}
