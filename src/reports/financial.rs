//! Financial Report
//!
//! Income, expenses and net balance for one user over an optional date
//! range, with the best performing categories and the transaction list.

use std::collections::HashMap;
use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{FinTrackError, FinTrackResult};
use crate::models::{DateWindow, Money, TransactionId, UserId};
use crate::services::CategoryService;
use crate::storage::Storage;

/// How many categories the report ranks
pub const TOP_CATEGORY_LIMIT: usize = 5;

/// Label used for transactions whose category no longer resolves
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Net balance of one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportCategory {
    pub category: String,
    pub net_category_balance: Money,
}

/// One line of the report's transaction list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTransaction {
    pub id: TransactionId,
    pub amount: Money,
    pub description: String,
    pub date: NaiveDate,
    pub category: String,
}

/// Financial report for a user
#[derive(Debug, Clone, Serialize)]
pub struct FinancialReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Sum of positive amounts
    pub total_income: Money,
    /// Sum of the absolute values of negative amounts
    pub total_expenses: Money,
    pub net_balance: Money,
    /// Highest net balance first, at most five
    pub top_categories: Vec<ReportCategory>,
    /// Newest first
    pub transactions: Vec<ReportTransaction>,
}

impl FinancialReport {
    /// Generate a report over `[start, end]`; either bound may be open
    pub fn generate(
        storage: &Storage,
        user_id: UserId,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> FinTrackResult<Self> {
        let names = CategoryService::new(storage).names(user_id)?;
        let transactions = storage
            .transactions
            .get_by_user_in_range(user_id, start_date, end_date)?;

        let mut total_income = Money::zero();
        let mut total_expenses = Money::zero();
        let mut by_category: HashMap<String, Money> = HashMap::new();
        let mut lines = Vec::with_capacity(transactions.len());

        for txn in transactions {
            if txn.amount.is_positive() {
                total_income += txn.amount;
            } else {
                total_expenses += txn.amount.abs();
            }

            let category = names
                .get(&txn.category_id)
                .cloned()
                .unwrap_or_else(|| UNCATEGORIZED.to_string());
            *by_category.entry(category.clone()).or_default() += txn.amount;

            lines.push(ReportTransaction {
                id: txn.id,
                amount: txn.amount,
                description: txn.description,
                date: txn.date,
                category,
            });
        }

        let mut top_categories: Vec<ReportCategory> = by_category
            .into_iter()
            .map(|(category, net_category_balance)| ReportCategory {
                category,
                net_category_balance,
            })
            .collect();
        top_categories.sort_by(|a, b| {
            b.net_category_balance
                .cmp(&a.net_category_balance)
                .then_with(|| a.category.cmp(&b.category))
        });
        top_categories.truncate(TOP_CATEGORY_LIMIT);

        Ok(Self {
            start_date,
            end_date,
            total_income,
            total_expenses,
            net_balance: total_income - total_expenses,
            top_categories,
            transactions: lines,
        })
    }

    /// Generate a report over a closed window
    pub fn for_window(storage: &Storage, user_id: UserId, window: DateWindow) -> FinTrackResult<Self> {
        Self::generate(storage, user_id, Some(window.start), Some(window.end))
    }

    fn period_label(&self) -> String {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => format!("{} to {}", start, end),
            (Some(start), None) => format!("since {}", start),
            (None, Some(end)) => format!("until {}", end),
            (None, None) => "all time".to_string(),
        }
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Financial Report: {}\n", self.period_label()));
        output.push_str(&"=".repeat(72));
        output.push('\n');
        output.push_str(&format!("Total Income:   {:>14}\n", self.total_income));
        output.push_str(&format!("Total Expenses: {:>14}\n", self.total_expenses));
        output.push_str(&format!("Net Balance:    {:>14}\n\n", self.net_balance));

        output.push_str("Top Categories\n");
        output.push_str(&"-".repeat(72));
        output.push('\n');
        if self.top_categories.is_empty() {
            output.push_str("  No data available\n");
        }
        for category in &self.top_categories {
            output.push_str(&format!(
                "  {:<40} {:>14}\n",
                category.category, category.net_category_balance
            ));
        }

        output.push_str(&format!("\nTransactions ({})\n", self.transactions.len()));
        output.push_str(&"-".repeat(72));
        output.push('\n');
        output.push_str(&format!(
            "{:<12} {:<30} {:<14} {:>12}\n",
            "Date", "Description", "Category", "Amount"
        ));
        for txn in &self.transactions {
            output.push_str(&format!(
                "{:<12} {:<30} {:<14} {:>12}\n",
                txn.date.to_string(),
                truncate(&txn.description, 30),
                truncate(&txn.category, 14),
                txn.amount
            ));
        }

        output
    }

    /// Export the report to CSV: one row per transaction, then the totals
    pub fn export_csv<W: Write>(&self, writer: W) -> FinTrackResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        let export_err = |e: csv::Error| FinTrackError::Export(e.to_string());

        csv.write_record(["id", "date", "description", "category", "amount"])
            .map_err(export_err)?;
        for txn in &self.transactions {
            csv.write_record([
                txn.id.as_uuid().to_string(),
                txn.date.to_string(),
                txn.description.clone(),
                txn.category.clone(),
                format!("{:.2}", txn.amount.to_decimal()),
            ])
            .map_err(export_err)?;
        }

        for (label, amount) in [
            ("TOTAL INCOME", self.total_income),
            ("TOTAL EXPENSES", self.total_expenses),
            ("NET BALANCE", self.net_balance),
        ] {
            csv.write_record([
                String::new(),
                String::new(),
                label.to_string(),
                String::new(),
                format!("{:.2}", amount.to_decimal()),
            ])
            .map_err(export_err)?;
        }

        csv.flush()
            .map_err(|e| FinTrackError::Export(e.to_string()))
    }

    /// Export the report as pretty-printed JSON
    pub fn export_json<W: Write>(&self, writer: W) -> FinTrackResult<()> {
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| FinTrackError::Export(e.to_string()))
    }

    /// Export the report as YAML
    pub fn export_yaml<W: Write>(&self, writer: W) -> FinTrackResult<()> {
        serde_yaml::to_writer(writer, self).map_err(|e| FinTrackError::Export(e.to_string()))
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
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

    fn add(
        storage: &Storage,
        user: UserId,
        category: &Category,
        kind: TransactionKind,
        cents: i64,
        on: NaiveDate,
    ) {
        let txn = Transaction::new(user, category.id, kind, Money::from_cents(cents), on)
            .with_description(format!("{} {}", category.name, cents));
        storage.transactions.upsert(txn).unwrap();
    }

    #[test]
    fn test_generate_totals_and_order() {
        let (_temp_dir, storage) = create_test_storage();
        let user = UserId::new();
        let work = Category::new(user, "Work");
        let food = Category::new(user, "Food");
        storage.categories.upsert(work.clone()).unwrap();
        storage.categories.upsert(food.clone()).unwrap();

        add(&storage, user, &work, TransactionKind::Income, 300000, date(1, 1));
        add(&storage, user, &food, TransactionKind::Expense, 4500, date(1, 10));
        add(&storage, user, &food, TransactionKind::Expense, 5500, date(1, 20));

        let report = FinancialReport::generate(&storage, user, None, None).unwrap();
        assert_eq!(report.total_income, Money::from_cents(300000));
        assert_eq!(report.total_expenses, Money::from_cents(10000));
        assert_eq!(report.net_balance, Money::from_cents(290000));
        assert_eq!(report.top_categories[0].category, "Work");
        assert_eq!(report.top_categories[1].net_category_balance, Money::from_cents(-10000));
        assert_eq!(report.transactions.len(), 3);
        assert_eq!(report.transactions[0].date, date(1, 20));
    }

    #[test]
    fn test_generate_respects_range_and_owner() {
        let (_temp_dir, storage) = create_test_storage();
        let user = UserId::new();
        let food = Category::new(user, "Food");
        storage.categories.upsert(food.clone()).unwrap();
        add(&storage, user, &food, TransactionKind::Expense, 1000, date(1, 5));
        add(&storage, user, &food, TransactionKind::Expense, 2000, date(2, 5));

        let other = UserId::new();
        let theirs = Category::new(other, "Food");
        storage.categories.upsert(theirs.clone()).unwrap();
        add(&storage, other, &theirs, TransactionKind::Expense, 9999, date(2, 5));

        let report =
            FinancialReport::generate(&storage, user, Some(date(2, 1)), Some(date(2, 28))).unwrap();
        assert_eq!(report.total_expenses, Money::from_cents(2000));
        assert_eq!(report.transactions.len(), 1);
    }

    #[test]
    fn test_top_categories_limited_to_five() {
        let (_temp_dir, storage) = create_test_storage();
        let user = UserId::new();
        for (i, name) in ["A", "B", "C", "D", "E", "F", "G"].iter().enumerate() {
            let category = Category::new(user, *name);
            storage.categories.upsert(category.clone()).unwrap();
            add(&storage, user, &category, TransactionKind::Income, 100 * (i as i64 + 1), date(3, 1));
        }

        let report = FinancialReport::generate(&storage, user, None, None).unwrap();
        assert_eq!(report.top_categories.len(), TOP_CATEGORY_LIMIT);
        assert_eq!(report.top_categories[0].category, "G");
        assert_eq!(report.top_categories[4].category, "C");
    }

    #[test]
    fn test_empty_report() {
        let (_temp_dir, storage) = create_test_storage();
        let report = FinancialReport::generate(&storage, UserId::new(), None, None).unwrap();
        assert!(report.net_balance.is_zero());
        assert!(report.top_categories.is_empty());
        assert!(report.format_terminal().contains("No data available"));
    }

    #[test]
    fn test_export_csv() {
        let (_temp_dir, storage) = create_test_storage();
        let user = UserId::new();
        let food = Category::new(user, "Food, Drinks");
        storage.categories.upsert(food.clone()).unwrap();
        add(&storage, user, &food, TransactionKind::Expense, 1250, date(1, 5));

        let report = FinancialReport::generate(&storage, user, None, None).unwrap();
        let mut buffer = Vec::new();
        report.export_csv(&mut buffer).unwrap();
        let csv = String::from_utf8(buffer).unwrap();

        assert!(csv.starts_with("id,date,description,category,amount\n"));
        assert!(csv.contains("\"Food, Drinks\",-12.50"));
        assert!(csv.contains("NET BALANCE,,-12.50"));
    }

    #[test]
    fn test_export_json_and_yaml() {
        let (_temp_dir, storage) = create_test_storage();
        let report =
            FinancialReport::generate(&storage, UserId::new(), Some(date(1, 1)), None).unwrap();

        let mut json = Vec::new();
        report.export_json(&mut json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["start_date"], "2025-01-01");
        assert!(value.get("end_date").is_none());

        let mut yaml = Vec::new();
        report.export_yaml(&mut yaml).unwrap();
        assert!(String::from_utf8(yaml).unwrap().contains("total_income"));
    }
}
