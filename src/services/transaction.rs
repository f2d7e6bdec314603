//! Transaction service
//!
//! Provides business logic for transaction management: filtered listing,
//! CRUD operations scoped to the owning user, and the per-range statistics
//! shown next to the transaction list.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{FinTrackError, FinTrackResult};
use crate::models::{
    CategoryId, DateRange, Money, Transaction, TransactionId, TransactionKind, UserId,
};
use crate::services::CategoryService;
use crate::storage::Storage;

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
}

/// Options for filtering transactions
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    /// Case-insensitive substring of the description
    pub search: Option<String>,
    /// Category name (case-insensitive)
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionKind>,
    pub date_range: Option<DateRange>,
    /// Lower bound on the signed amount
    pub min_amount: Option<Money>,
    /// Upper bound on the signed amount
    pub max_amount: Option<Money>,
}

impl TransactionFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn category(mut self, name: impl Into<String>) -> Self {
        self.category = Some(name.into());
        self
    }

    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn amount_between(mut self, min: Option<Money>, max: Option<Money>) -> Self {
        self.min_amount = min;
        self.max_amount = max;
        self
    }

    fn matches(&self, txn: &Transaction, category_name: &str, today: NaiveDate) -> bool {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            if !txn
                .description
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }

        if let Some(category) = self.category.as_deref().filter(|s| !s.is_empty()) {
            if category_name.to_lowercase() != category.trim().to_lowercase() {
                return false;
            }
        }

        if self.kind.is_some_and(|kind| kind != txn.kind) {
            return false;
        }

        if let Some(range) = self.date_range {
            if !range.window(today).contains(txn.date) {
                return false;
            }
        }

        self.min_amount.map_or(true, |min| txn.amount >= min)
            && self.max_amount.map_or(true, |max| txn.amount <= max)
    }
}

/// Input for creating a new transaction
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransactionInput {
    /// Signed or unsigned; the kind decides the stored sign
    pub amount: Money,
    /// Inferred from the sign of `amount` when absent
    #[serde(rename = "type", default)]
    pub kind: Option<TransactionKind>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "categoryId")]
    pub category_id: CategoryId,
    /// Defaults to today
    #[serde(default, alias = "transactionDate")]
    pub transaction_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update of a transaction; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTransactionInput {
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(rename = "type", default)]
    pub kind: Option<TransactionKind>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "categoryId")]
    pub category_id: Option<CategoryId>,
    #[serde(default, alias = "transactionDate")]
    pub transaction_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A transaction as the API presents it, with its category name resolved
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub id: TransactionId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Money,
    pub description: String,
    pub category: String,
    pub category_id: CategoryId,
    pub transaction_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransactionView {
    pub fn new(txn: Transaction, category: impl Into<String>) -> Self {
        Self {
            id: txn.id,
            user_id: txn.user_id,
            kind: txn.kind,
            amount: txn.amount,
            description: txn.description,
            category: category.into(),
            category_id: txn.category_id,
            transaction_date: txn.date,
            notes: txn.notes,
            created_at: txn.created_at,
            updated_at: txn.updated_at,
        }
    }
}

/// Totals over a date range
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStats {
    pub total_transactions: usize,
    pub total_income: Money,
    pub total_expenses: Money,
    /// Net balance divided by the number of days in the range
    pub average_daily: Money,
}

/// Absolute total for one (category, kind) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Money,
}

/// Resolve the kind of a new amount: explicit kind wins, otherwise the sign decides
fn resolve_kind(kind: Option<TransactionKind>, amount: Money) -> FinTrackResult<TransactionKind> {
    if amount.is_zero() {
        return Err(FinTrackError::Validation("Amount cannot be zero".into()));
    }
    match kind {
        Some(kind) => Ok(kind),
        None => TransactionKind::from_amount(amount)
            .ok_or_else(|| FinTrackError::Validation("Amount cannot be zero".into())),
    }
}

impl<'a> TransactionService<'a> {
    /// Create a new transaction service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// List a user's transactions matching `filter`, newest first
    pub fn list(
        &self,
        user_id: UserId,
        filter: &TransactionFilter,
        today: NaiveDate,
    ) -> FinTrackResult<Vec<TransactionView>> {
        let names = CategoryService::new(self.storage).names(user_id)?;
        Ok(self
            .storage
            .transactions
            .get_by_user(user_id)?
            .into_iter()
            .filter_map(|txn| {
                let name = names.get(&txn.category_id).cloned().unwrap_or_default();
                filter
                    .matches(&txn, &name, today)
                    .then(|| TransactionView::new(txn, name))
            })
            .collect())
    }

    /// Get one of a user's transactions
    pub fn get(&self, user_id: UserId, id: TransactionId) -> FinTrackResult<Transaction> {
        self.storage
            .transactions
            .get(id)?
            .filter(|t| t.user_id == user_id)
            .ok_or_else(|| FinTrackError::transaction_not_found(id.to_string()))
    }

    /// Get one of a user's transactions with its category name
    pub fn view(&self, user_id: UserId, id: TransactionId) -> FinTrackResult<TransactionView> {
        let txn = self.get(user_id, id)?;
        self.to_view(txn)
    }

    /// Create a new transaction
    pub fn create(
        &self,
        user_id: UserId,
        input: CreateTransactionInput,
        today: NaiveDate,
    ) -> FinTrackResult<TransactionView> {
        let kind = resolve_kind(input.kind, input.amount)?;

        let _guard = self.storage.lock_writes()?;
        let category = CategoryService::new(self.storage).get(user_id, input.category_id)?;

        let mut txn = Transaction::new(
            user_id,
            category.id,
            kind,
            input.amount,
            input.transaction_date.unwrap_or(today),
        );
        if let Some(description) = input.description {
            txn.description = description.trim().to_string();
        }
        txn.notes = input.notes.filter(|n| !n.trim().is_empty());

        txn.validate()
            .map_err(|e| FinTrackError::Validation(e.to_string()))?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;

        info!(user_id = %user_id, transaction_id = %txn.id, kind = %txn.kind, "transaction created");
        Ok(TransactionView::new(txn, category.name))
    }

    /// Apply a partial update, re-normalising the sign of the amount
    pub fn update(
        &self,
        user_id: UserId,
        id: TransactionId,
        input: UpdateTransactionInput,
    ) -> FinTrackResult<TransactionView> {
        let _guard = self.storage.lock_writes()?;
        let mut txn = self.get(user_id, id)?;

        match (input.amount, input.kind) {
            (Some(amount), kind) => {
                let kind = resolve_kind(kind, amount)?;
                txn.set_amount(kind, amount);
            }
            (None, Some(kind)) => {
                let amount = txn.amount;
                txn.set_amount(kind, amount);
            }
            (None, None) => {}
        }

        if let Some(category_id) = input.category_id {
            let category = CategoryService::new(self.storage).get(user_id, category_id)?;
            txn.category_id = category.id;
        }
        if let Some(description) = input.description {
            txn.description = description.trim().to_string();
        }
        if let Some(date) = input.transaction_date {
            txn.date = date;
        }
        if let Some(notes) = input.notes {
            txn.notes = Some(notes).filter(|n| !n.trim().is_empty());
        }
        txn.touch();

        txn.validate()
            .map_err(|e| FinTrackError::Validation(e.to_string()))?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;

        self.to_view(txn)
    }

    /// Delete one of a user's transactions
    pub fn delete(&self, user_id: UserId, id: TransactionId) -> FinTrackResult<Transaction> {
        let _guard = self.storage.lock_writes()?;
        let txn = self.get(user_id, id)?;

        self.storage.transactions.delete(id)?;
        self.storage.transactions.save()?;

        info!(user_id = %user_id, transaction_id = %id, "transaction deleted");
        Ok(txn)
    }

    /// Count and totals over a range; the last 30 days when no range is given
    pub fn stats(
        &self,
        user_id: UserId,
        range: Option<DateRange>,
        today: NaiveDate,
    ) -> FinTrackResult<TransactionStats> {
        let range = range.unwrap_or(DateRange::Month);
        let window = range.window(today);
        let transactions = self.storage.transactions.get_by_user_in_range(
            user_id,
            Some(window.start),
            Some(window.end),
        )?;

        let mut total_income = Money::zero();
        let mut total_expenses = Money::zero();
        for txn in &transactions {
            match txn.kind {
                TransactionKind::Income => total_income += txn.amount.abs(),
                TransactionKind::Expense => total_expenses += txn.amount.abs(),
            }
        }

        let days = range.average_days().max(1);
        Ok(TransactionStats {
            total_transactions: transactions.len(),
            total_income,
            total_expenses,
            average_daily: (total_income - total_expenses).scale(1.0 / days as f64),
        })
    }

    /// Absolute totals per category and kind, largest first; all time when no range is given
    pub fn breakdown(
        &self,
        user_id: UserId,
        range: Option<DateRange>,
        today: NaiveDate,
    ) -> FinTrackResult<Vec<CategoryTotal>> {
        let names = CategoryService::new(self.storage).names(user_id)?;
        let (start, end) = match range {
            Some(range) => {
                let window = range.window(today);
                (Some(window.start), Some(window.end))
            }
            None => (None, None),
        };

        let mut totals: HashMap<(CategoryId, TransactionKind), Money> = HashMap::new();
        for txn in self
            .storage
            .transactions
            .get_by_user_in_range(user_id, start, end)?
        {
            *totals.entry((txn.category_id, txn.kind)).or_default() += txn.amount.abs();
        }

        let mut breakdown: Vec<CategoryTotal> = totals
            .into_iter()
            .map(|((category_id, kind), amount)| CategoryTotal {
                category: names.get(&category_id).cloned().unwrap_or_default(),
                kind,
                amount,
            })
            .collect();
        breakdown.sort_by(|a, b| {
            b.amount
                .cmp(&a.amount)
                .then_with(|| a.category.cmp(&b.category))
                .then_with(|| a.kind.cmp(&b.kind))
        });
        Ok(breakdown)
    }

    fn to_view(&self, txn: Transaction) -> FinTrackResult<TransactionView> {
        let name = self
            .storage
            .categories
            .get(txn.category_id)?
            .map(|c| c.name)
            .unwrap_or_default();
        Ok(TransactionView::new(txn, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FinTrackPaths;
    use crate::models::Category;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = FinTrackPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
    }

    fn setup() -> (TempDir, Storage, UserId, Category, Category) {
        let (temp_dir, storage) = create_test_storage();
        let user = UserId::new();
        let food = Category::new(user, "Food");
        let work = Category::new(user, "Work");
        storage.categories.upsert(food.clone()).unwrap();
        storage.categories.upsert(work.clone()).unwrap();
        (temp_dir, storage, user, food, work)
    }

    fn input(category: &Category, cents: i64, days_ago: i64, description: &str) -> CreateTransactionInput {
        CreateTransactionInput {
            amount: Money::from_cents(cents),
            kind: None,
            description: Some(description.into()),
            category_id: category.id,
            transaction_date: Some(today() - chrono::Duration::days(days_ago)),
            notes: None,
        }
    }

    #[test]
    fn test_create_infers_kind_from_sign() {
        let (_temp_dir, storage, user, food, work) = setup();
        let service = TransactionService::new(&storage);

        let expense = service.create(user, input(&food, -2500, 0, "Lunch"), today()).unwrap();
        assert_eq!(expense.kind, TransactionKind::Expense);
        assert_eq!(expense.amount, Money::from_cents(-2500));
        assert_eq!(expense.category, "Food");

        let income = service.create(user, input(&work, 300000, 0, "Salary"), today()).unwrap();
        assert_eq!(income.kind, TransactionKind::Income);
    }

    #[test]
    fn test_create_normalises_sign_from_kind() {
        let (_temp_dir, storage, user, food, _) = setup();
        let service = TransactionService::new(&storage);

        let mut new = input(&food, 1999, 0, "Groceries");
        new.kind = Some(TransactionKind::Expense);
        let view = service.create(user, new, today()).unwrap();
        assert_eq!(view.amount, Money::from_cents(-1999));
    }

    #[test]
    fn test_create_rejects_zero_and_foreign_category() {
        let (_temp_dir, storage, user, food, _) = setup();
        let service = TransactionService::new(&storage);

        let zero = service.create(user, input(&food, 0, 0, "Nothing"), today());
        assert!(zero.unwrap_err().is_validation());

        let foreign = Category::new(UserId::new(), "Other");
        storage.categories.upsert(foreign.clone()).unwrap();
        let err = service
            .create(user, input(&foreign, -100, 0, "Sneaky"), today())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_create_defaults_date_to_today() {
        let (_temp_dir, storage, user, food, _) = setup();
        let service = TransactionService::new(&storage);

        let mut new = input(&food, -100, 0, "Coffee");
        new.transaction_date = None;
        let view = service.create(user, new, today()).unwrap();
        assert_eq!(view.transaction_date, today());
    }

    #[test]
    fn test_list_filters() {
        let (_temp_dir, storage, user, food, work) = setup();
        let service = TransactionService::new(&storage);
        service.create(user, input(&food, -1500, 1, "Supermarket run"), today()).unwrap();
        service.create(user, input(&food, -4000, 20, "Restaurant"), today()).unwrap();
        service.create(user, input(&work, 250000, 3, "Salary"), today()).unwrap();

        let all = service.list(user, &TransactionFilter::new(), today()).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].description, "Supermarket run");

        let search = TransactionFilter::new().search("MARKET");
        assert_eq!(service.list(user, &search, today()).unwrap().len(), 1);

        let by_category = TransactionFilter::new().category("food");
        assert_eq!(service.list(user, &by_category, today()).unwrap().len(), 2);

        let week = TransactionFilter::new()
            .date_range(DateRange::Week)
            .kind(TransactionKind::Expense);
        let found = service.list(user, &week, today()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].description, "Supermarket run");

        let big_expenses = TransactionFilter::new().amount_between(None, Some(Money::from_cents(-2000)));
        let found = service.list(user, &big_expenses, today()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].description, "Restaurant");

        assert!(service
            .list(UserId::new(), &TransactionFilter::new(), today())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_update_renormalises() {
        let (_temp_dir, storage, user, food, work) = setup();
        let service = TransactionService::new(&storage);
        let view = service.create(user, input(&food, -1500, 0, "Refund"), today()).unwrap();

        let updated = service
            .update(
                user,
                view.id,
                UpdateTransactionInput {
                    kind: Some(TransactionKind::Income),
                    category_id: Some(work.id),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.amount, Money::from_cents(1500));
        assert_eq!(updated.category, "Work");
        assert_eq!(updated.description, "Refund");

        let zero = service.update(
            user,
            view.id,
            UpdateTransactionInput {
                amount: Some(Money::zero()),
                ..Default::default()
            },
        );
        assert!(zero.unwrap_err().is_validation());
    }

    #[test]
    fn test_delete_scoped_to_owner() {
        let (_temp_dir, storage, user, food, _) = setup();
        let service = TransactionService::new(&storage);
        let view = service.create(user, input(&food, -1500, 0, "Lunch"), today()).unwrap();

        assert!(service.delete(UserId::new(), view.id).unwrap_err().is_not_found());
        service.delete(user, view.id).unwrap();
        assert!(service.delete(user, view.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_stats() {
        let (_temp_dir, storage, user, food, work) = setup();
        let service = TransactionService::new(&storage);
        service.create(user, input(&work, 100000, 2, "Salary"), today()).unwrap();
        service.create(user, input(&food, -40000, 5, "Groceries"), today()).unwrap();
        service.create(user, input(&food, -99900, 60, "Old"), today()).unwrap();

        let stats = service.stats(user, None, today()).unwrap();
        assert_eq!(stats.total_transactions, 2);
        assert_eq!(stats.total_income, Money::from_cents(100000));
        assert_eq!(stats.total_expenses, Money::from_cents(40000));
        assert_eq!(stats.average_daily, Money::from_cents(2000));

        let today_only = service.stats(user, Some(DateRange::Today), today()).unwrap();
        assert_eq!(today_only.total_transactions, 0);
    }

    #[test]
    fn test_breakdown() {
        let (_temp_dir, storage, user, food, work) = setup();
        let service = TransactionService::new(&storage);
        service.create(user, input(&food, -1000, 1, "A"), today()).unwrap();
        service.create(user, input(&food, -2000, 100, "B"), today()).unwrap();
        service.create(user, input(&work, 5000, 1, "C"), today()).unwrap();

        let all_time = service.breakdown(user, None, today()).unwrap();
        assert_eq!(
            all_time,
            vec![
                CategoryTotal {
                    category: "Work".into(),
                    kind: TransactionKind::Income,
                    amount: Money::from_cents(5000),
                },
                CategoryTotal {
                    category: "Food".into(),
                    kind: TransactionKind::Expense,
                    amount: Money::from_cents(3000),
                },
            ]
        );

        let month = service.breakdown(user, Some(DateRange::Month), today()).unwrap();
        assert_eq!(month[1].amount, Money::from_cents(1000));
    }
}
