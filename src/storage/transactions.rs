//! Transaction repository for JSON storage
//!
//! Manages loading and saving transactions to transactions.json. Lists come
//! back newest first: date descending, then creation time descending.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;

use crate::error::FinTrackError;
use crate::models::{CategoryId, Transaction, TransactionId, UserId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable transaction data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

/// Repository for transaction persistence with a per-user index
pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<HashMap<TransactionId, Transaction>>,
    /// Index: user_id -> transaction_ids
    by_user: RwLock<HashMap<UserId, Vec<TransactionId>>>,
}

pub(crate) fn newest_first(list: &mut [Transaction]) {
    list.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

impl TransactionRepository {
    /// Create a new transaction repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_user: RwLock::new(HashMap::new()),
        }
    }

    /// Load transactions from disk and build the index
    pub fn load(&self) -> Result<(), FinTrackError> {
        let file_data: TransactionData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_user = self
            .by_user
            .write()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        by_user.clear();

        for txn in file_data.transactions {
            by_user.entry(txn.user_id).or_default().push(txn.id);
            data.insert(txn.id, txn);
        }

        Ok(())
    }

    /// Save transactions to disk
    pub fn save(&self) -> Result<(), FinTrackError> {
        let data = self
            .data
            .read()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut transactions: Vec<_> = data.values().cloned().collect();
        newest_first(&mut transactions);

        write_json_atomic(&self.path, &TransactionData { transactions })
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> Result<Option<Transaction>, FinTrackError> {
        let data = self
            .data
            .read()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get all transactions, newest first
    pub fn get_all(&self) -> Result<Vec<Transaction>, FinTrackError> {
        let data = self
            .data
            .read()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = data.values().cloned().collect();
        newest_first(&mut list);
        Ok(list)
    }

    /// Get a user's transactions, newest first
    pub fn get_by_user(&self, user_id: UserId) -> Result<Vec<Transaction>, FinTrackError> {
        let data = self
            .data
            .read()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let by_user = self
            .by_user
            .read()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = by_user
            .get(&user_id)
            .map(|ids| ids.iter().filter_map(|id| data.get(id).cloned()).collect())
            .unwrap_or_default();
        newest_first(&mut list);
        Ok(list)
    }

    /// Get a user's transactions dated within `[start, end]`, newest first
    pub fn get_by_user_in_range(
        &self,
        user_id: UserId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>, FinTrackError> {
        let mut list = self.get_by_user(user_id)?;
        list.retain(|t| t.in_range(start, end));
        Ok(list)
    }

    /// Get transactions in a category, newest first
    pub fn get_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Transaction>, FinTrackError> {
        let data = self
            .data
            .read()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = data
            .values()
            .filter(|t| t.category_id == category_id)
            .cloned()
            .collect();
        newest_first(&mut list);
        Ok(list)
    }

    /// Insert or update a transaction
    pub fn upsert(&self, txn: Transaction) -> Result<(), FinTrackError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_user = self
            .by_user
            .write()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        // Owner never changes, so the index only needs the new entry
        if !data.contains_key(&txn.id) {
            by_user.entry(txn.user_id).or_default().push(txn.id);
        }
        data.insert(txn.id, txn);
        Ok(())
    }

    /// Delete a transaction
    pub fn delete(&self, id: TransactionId) -> Result<bool, FinTrackError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_user = self
            .by_user
            .write()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        match data.remove(&id) {
            Some(txn) => {
                if let Some(ids) = by_user.get_mut(&txn.user_id) {
                    ids.retain(|t| *t != id);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Delete every transaction in a category, returning how many were removed
    pub fn delete_for_category(&self, category_id: CategoryId) -> Result<usize, FinTrackError> {
        self.delete_where(|t| t.category_id == category_id)
    }

    /// Delete every transaction owned by a user, returning how many were removed
    pub fn delete_for_user(&self, user_id: UserId) -> Result<usize, FinTrackError> {
        self.delete_where(|t| t.user_id == user_id)
    }

    fn delete_where<F>(&self, predicate: F) -> Result<usize, FinTrackError>
    where
        F: Fn(&Transaction) -> bool,
    {
        let mut data = self
            .data
            .write()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_user = self
            .by_user
            .write()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let doomed: Vec<_> = data
            .values()
            .filter(|t| predicate(t))
            .map(|t| (t.id, t.user_id))
            .collect();

        for (id, user_id) in &doomed {
            data.remove(id);
            if let Some(ids) = by_user.get_mut(user_id) {
                ids.retain(|t| t != id);
            }
        }
        by_user.retain(|_, ids| !ids.is_empty());

        Ok(doomed.len())
    }

    /// Count transactions
    pub fn count(&self) -> Result<usize, FinTrackError> {
        let data = self
            .data
            .read()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}
