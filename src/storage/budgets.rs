//! Budget repository for JSON storage
//!
//! Manages loading and saving budgets to budgets.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::FinTrackError;
use crate::models::{Budget, BudgetId, CategoryId, UserId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable budget data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct BudgetData {
    budgets: Vec<Budget>,
}

/// Repository for budget persistence
pub struct BudgetRepository {
    path: PathBuf,
    data: RwLock<HashMap<BudgetId, Budget>>,
}

fn sort_budgets(list: &mut [Budget]) {
    list.sort_by(|a, b| {
        a.start_date
            .cmp(&b.start_date)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

impl BudgetRepository {
    /// Create a new budget repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load budgets from disk
    pub fn load(&self) -> Result<(), FinTrackError> {
        let file_data: BudgetData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for budget in file_data.budgets {
            data.insert(budget.id, budget);
        }

        Ok(())
    }

    /// Save budgets to disk
    pub fn save(&self) -> Result<(), FinTrackError> {
        let data = self
            .data
            .read()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut budgets: Vec<_> = data.values().cloned().collect();
        sort_budgets(&mut budgets);

        write_json_atomic(&self.path, &BudgetData { budgets })
    }

    /// Get a budget by ID
    pub fn get(&self, id: BudgetId) -> Result<Option<Budget>, FinTrackError> {
        let data = self
            .data
            .read()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get all budgets
    pub fn get_all(&self) -> Result<Vec<Budget>, FinTrackError> {
        let data = self
            .data
            .read()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = data.values().cloned().collect();
        sort_budgets(&mut list);
        Ok(list)
    }

    /// Get a user's budgets, earliest start first
    pub fn get_by_user(&self, user_id: UserId) -> Result<Vec<Budget>, FinTrackError> {
        let data = self
            .data
            .read()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = data
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        sort_budgets(&mut list);
        Ok(list)
    }

    /// Get the budgets limiting a category
    pub fn get_by_category(&self, category_id: CategoryId) -> Result<Vec<Budget>, FinTrackError> {
        let data = self
            .data
            .read()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = data
            .values()
            .filter(|b| b.category_id == category_id)
            .cloned()
            .collect();
        sort_budgets(&mut list);
        Ok(list)
    }

    /// Insert or update a budget
    pub fn upsert(&self, budget: Budget) -> Result<(), FinTrackError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(budget.id, budget);
        Ok(())
    }

    /// Delete a budget
    pub fn delete(&self, id: BudgetId) -> Result<bool, FinTrackError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id).is_some())
    }

    /// Delete all budgets for a category, returning how many were removed
    pub fn delete_for_category(&self, category_id: CategoryId) -> Result<usize, FinTrackError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let before = data.len();
        data.retain(|_, b| b.category_id != category_id);
        Ok(before - data.len())
    }

    /// Delete all budgets owned by a user, returning how many were removed
    pub fn delete_for_user(&self, user_id: UserId) -> Result<usize, FinTrackError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let before = data.len();
        data.retain(|_, b| b.user_id != user_id);
        Ok(before - data.len())
    }

    /// Count budgets
    pub fn count(&self) -> Result<usize, FinTrackError> {
        let data = self
            .data
            .read()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, BudgetRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("budgets.json");
        let repo = BudgetRepository::new(path);
        (temp_dir, repo)
    }

    fn budget(user: UserId, category: CategoryId, month: u32) -> Budget {
        Budget::new(
            user,
            category,
            "Food",
            Money::from_cents(40000),
            NaiveDate::from_ymd_opt(2025, month, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, month, 28).unwrap(),
        )
    }

    #[test]
    fn test_get_by_user_sorted_by_start() {
        let (_temp_dir, repo) = create_test_repo();
        let user = UserId::new();
        let category = CategoryId::new();
        repo.upsert(budget(user, category, 3)).unwrap();
        repo.upsert(budget(user, category, 1)).unwrap();
        repo.upsert(budget(UserId::new(), category, 2)).unwrap();

        let list = repo.get_by_user(user).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list[0].start_date < list[1].start_date);
    }

    #[test]
    fn test_cascade_helpers() {
        let (_temp_dir, repo) = create_test_repo();
        let user = UserId::new();
        let food = CategoryId::new();
        let rent = CategoryId::new();
        repo.upsert(budget(user, food, 1)).unwrap();
        repo.upsert(budget(user, food, 2)).unwrap();
        repo.upsert(budget(user, rent, 1)).unwrap();

        assert_eq!(repo.delete_for_category(food).unwrap(), 2);
        assert_eq!(repo.get_by_category(rent).unwrap().len(), 1);
        assert_eq!(repo.delete_for_user(user).unwrap(), 1);
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let b = budget(UserId::new(), CategoryId::new(), 4);
        let id = b.id;
        repo.upsert(b).unwrap();
        repo.save().unwrap();

        let repo2 = BudgetRepository::new(temp_dir.path().join("budgets.json"));
        repo2.load().unwrap();
        let loaded = repo2.get(id).unwrap().unwrap();
        assert_eq!(loaded.amount.cents(), 40000);
        assert_eq!(loaded.alert_threshold, 80.0);
    }
}
