//! Budget service
//!
//! CRUD for category budgets plus the spending lookup every budget metric
//! is built on.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::error::{FinTrackError, FinTrackResult};
use crate::models::{Budget, BudgetId, CategoryId, Money, UserId};
use crate::services::CategoryService;
use crate::storage::Storage;

/// Service for budget management
pub struct BudgetService<'a> {
    storage: &'a Storage,
}

/// Input for creating a budget
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBudgetInput {
    pub amount: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(alias = "categoryId")]
    pub category_id: CategoryId,
    /// Defaults to the category name
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub alert_threshold: Option<f64>,
}

/// Partial update of a budget; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBudgetInput {
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default, alias = "categoryId")]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub alert_threshold: Option<f64>,
}

impl<'a> BudgetService<'a> {
    /// Create a new budget service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// List a user's budgets
    pub fn list(&self, user_id: UserId) -> FinTrackResult<Vec<Budget>> {
        self.storage.budgets.get_by_user(user_id)
    }

    /// Get one of a user's budgets
    pub fn get(&self, user_id: UserId, id: BudgetId) -> FinTrackResult<Budget> {
        self.storage
            .budgets
            .get(id)?
            .filter(|b| b.user_id == user_id)
            .ok_or_else(|| FinTrackError::budget_not_found(id.to_string()))
    }

    /// Create a new budget
    pub fn create(&self, user_id: UserId, input: CreateBudgetInput) -> FinTrackResult<Budget> {
        let _guard = self.storage.lock_writes()?;
        let category = CategoryService::new(self.storage).get(user_id, input.category_id)?;

        let name = input
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| category.name.clone());

        let mut budget = Budget::new(
            user_id,
            category.id,
            name,
            input.amount,
            input.start_date,
            input.end_date,
        );
        if let Some(threshold) = input.alert_threshold {
            budget.alert_threshold = threshold;
        }

        budget
            .validate()
            .map_err(|e| FinTrackError::Validation(e.to_string()))?;

        self.storage.budgets.upsert(budget.clone())?;
        self.storage.budgets.save()?;

        info!(user_id = %user_id, budget_id = %budget.id, amount = %budget.amount, "budget created");
        Ok(budget)
    }

    /// Apply a partial update; the merged dates must still be in order
    pub fn update(
        &self,
        user_id: UserId,
        id: BudgetId,
        input: UpdateBudgetInput,
    ) -> FinTrackResult<Budget> {
        let _guard = self.storage.lock_writes()?;
        let mut budget = self.get(user_id, id)?;

        if let Some(category_id) = input.category_id {
            let category = CategoryService::new(self.storage).get(user_id, category_id)?;
            budget.category_id = category.id;
        }
        if let Some(amount) = input.amount {
            budget.amount = amount;
        }
        if let Some(start) = input.start_date {
            budget.start_date = start;
        }
        if let Some(end) = input.end_date {
            budget.end_date = end;
        }
        if let Some(name) = input.name {
            budget.name = name.trim().to_string();
        }
        if let Some(threshold) = input.alert_threshold {
            budget.alert_threshold = threshold;
        }
        budget.touch();

        budget
            .validate()
            .map_err(|e| FinTrackError::Validation(e.to_string()))?;

        self.storage.budgets.upsert(budget.clone())?;
        self.storage.budgets.save()?;

        Ok(budget)
    }

    /// Delete one of a user's budgets
    pub fn delete(&self, user_id: UserId, id: BudgetId) -> FinTrackResult<Budget> {
        let _guard = self.storage.lock_writes()?;
        let budget = self.get(user_id, id)?;

        self.storage.budgets.delete(id)?;
        self.storage.budgets.save()?;

        info!(user_id = %user_id, budget_id = %id, "budget deleted");
        Ok(budget)
    }

    /// Expense total in the budget's category over its whole window
    pub fn spent(&self, budget: &Budget) -> FinTrackResult<Money> {
        self.spent_between(budget, budget.start_date, budget.end_date)
    }

    /// Expense total in the budget's category over `[start, end]`
    pub fn spent_between(
        &self,
        budget: &Budget,
        start: NaiveDate,
        end: NaiveDate,
    ) -> FinTrackResult<Money> {
        Ok(self
            .storage
            .transactions
            .get_by_user_in_range(budget.user_id, Some(start), Some(end))?
            .iter()
            .filter(|t| t.category_id == budget.category_id && t.is_expense())
            .map(|t| t.amount.abs())
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FinTrackPaths;
    use crate::models::{Category, Transaction, TransactionKind};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = FinTrackPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).unwrap()
    }

    fn input(category: &Category, cents: i64) -> CreateBudgetInput {
        CreateBudgetInput {
            amount: Money::from_cents(cents),
            start_date: date(3, 1),
            end_date: date(3, 31),
            category_id: category.id,
            name: None,
            alert_threshold: None,
        }
    }

    #[test]
    fn test_create_defaults_name_and_threshold() {
        let (_temp_dir, storage) = create_test_storage();
        let user = UserId::new();
        let food = Category::new(user, "Food");
        storage.categories.upsert(food.clone()).unwrap();
        let service = BudgetService::new(&storage);

        let budget = service.create(user, input(&food, 50000)).unwrap();
        assert_eq!(budget.name, "Food");
        assert_eq!(budget.alert_threshold, 80.0);
        assert_eq!(service.list(user).unwrap().len(), 1);
    }

    #[test]
    fn test_create_validation() {
        let (_temp_dir, storage) = create_test_storage();
        let user = UserId::new();
        let food = Category::new(user, "Food");
        storage.categories.upsert(food.clone()).unwrap();
        let service = BudgetService::new(&storage);

        assert!(service.create(user, input(&food, 0)).unwrap_err().is_validation());

        let mut inverted = input(&food, 100);
        inverted.start_date = date(4, 1);
        assert!(service.create(user, inverted).unwrap_err().is_validation());

        let foreign = Category::new(UserId::new(), "Food");
        storage.categories.upsert(foreign.clone()).unwrap();
        assert!(service.create(user, input(&foreign, 100)).unwrap_err().is_not_found());
    }

    #[test]
    fn test_update_checks_merged_dates() {
        let (_temp_dir, storage) = create_test_storage();
        let user = UserId::new();
        let food = Category::new(user, "Food");
        storage.categories.upsert(food.clone()).unwrap();
        let service = BudgetService::new(&storage);
        let budget = service.create(user, input(&food, 50000)).unwrap();

        let bad = service.update(
            user,
            budget.id,
            UpdateBudgetInput {
                start_date: Some(date(5, 1)),
                ..Default::default()
            },
        );
        assert!(bad.unwrap_err().is_validation());

        let updated = service
            .update(
                user,
                budget.id,
                UpdateBudgetInput {
                    amount: Some(Money::from_cents(60000)),
                    end_date: Some(date(4, 30)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.amount, Money::from_cents(60000));
        assert_eq!(updated.end_date, date(4, 30));
        assert!(service
            .update(UserId::new(), budget.id, UpdateBudgetInput::default())
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_spent_counts_only_category_expenses_in_window() {
        let (_temp_dir, storage) = create_test_storage();
        let user = UserId::new();
        let food = Category::new(user, "Food");
        let work = Category::new(user, "Work");
        storage.categories.upsert(food.clone()).unwrap();
        storage.categories.upsert(work.clone()).unwrap();
        let service = BudgetService::new(&storage);
        let budget = service.create(user, input(&food, 50000)).unwrap();

        let txns = [
            Transaction::new(user, food.id, TransactionKind::Expense, Money::from_cents(1000), date(3, 5)),
            Transaction::new(user, food.id, TransactionKind::Expense, Money::from_cents(2500), date(3, 31)),
            Transaction::new(user, food.id, TransactionKind::Expense, Money::from_cents(9900), date(4, 1)),
            Transaction::new(user, food.id, TransactionKind::Income, Money::from_cents(700), date(3, 6)),
            Transaction::new(user, work.id, TransactionKind::Expense, Money::from_cents(4400), date(3, 6)),
        ];
        for txn in txns {
            storage.transactions.upsert(txn).unwrap();
        }

        assert_eq!(service.spent(&budget).unwrap(), Money::from_cents(3500));
        assert_eq!(
            service.spent_between(&budget, date(3, 1), date(3, 10)).unwrap(),
            Money::from_cents(1000)
        );
    }
}
