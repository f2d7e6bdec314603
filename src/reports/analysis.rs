//! Period analysis
//!
//! Summary figures, per-category breakdowns compared with the preceding
//! window, and month-by-month trends for the reports screen.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::FinTrackResult;
use crate::models::{
    CategoryId, DateRange, DateWindow, Money, MonthPeriod, Transaction, TransactionKind, UserId,
};
use crate::services::{BudgetService, CategoryService};
use crate::storage::Storage;

use super::financial::{FinancialReport, UNCATEGORIZED};

/// Round to one decimal place for percentages
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Headline figures for a period
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_income: Money,
    pub total_expenses: Money,
    pub net_balance: Money,
    pub savings_rate: f64,
    pub average_daily_spending: Money,
    /// Share of the period's budgets that stayed within their limit
    pub budget_compliance: f64,
    pub period: DateRange,
}

impl ReportSummary {
    pub fn generate(
        storage: &Storage,
        user_id: UserId,
        period: DateRange,
        today: NaiveDate,
    ) -> FinTrackResult<Self> {
        let window = period.window(today);
        let report = FinancialReport::for_window(storage, user_id, window)?;

        let savings_rate = if report.total_income.is_positive() {
            round1(
                report
                    .net_balance
                    .percent_of(report.total_income)
                    .unwrap_or(0.0),
            )
        } else {
            0.0
        };

        Ok(Self {
            total_income: report.total_income,
            total_expenses: report.total_expenses,
            net_balance: report.net_balance,
            savings_rate,
            average_daily_spending: report
                .total_expenses
                .scale(1.0 / window.days().max(1) as f64),
            budget_compliance: budget_compliance(storage, user_id, window)?,
            period,
        })
    }
}

/// Percentage of budgets overlapping `window` whose spending stayed within the limit
pub fn budget_compliance(
    storage: &Storage,
    user_id: UserId,
    window: DateWindow,
) -> FinTrackResult<f64> {
    let service = BudgetService::new(storage);
    let budgets: Vec<_> = service
        .list(user_id)?
        .into_iter()
        .filter(|b| b.overlaps(window.start, window.end))
        .collect();

    if budgets.is_empty() {
        return Ok(100.0);
    }

    let mut within = 0usize;
    for budget in &budgets {
        if service.spent(budget)? <= budget.amount {
            within += 1;
        }
    }
    Ok(round1(within as f64 / budgets.len() as f64 * 100.0))
}

/// Direction of a category total compared with the previous window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    fn between(previous: Money, current: Money) -> Self {
        match current.cmp(&previous) {
            std::cmp::Ordering::Greater => Self::Up,
            std::cmp::Ordering::Less => Self::Down,
            std::cmp::Ordering::Equal => Self::Stable,
        }
    }
}

/// Percentage change from `previous` to `current`
///
/// Growing from nothing counts as +100%.
pub fn percent_change(previous: Money, current: Money) -> f64 {
    if previous.is_zero() {
        if current.is_zero() {
            0.0
        } else {
            100.0
        }
    } else {
        round1((current - previous).percent_of(previous.abs()).unwrap_or(0.0))
    }
}

/// One category's share of income or expenses in a period
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAnalysis {
    pub category: String,
    pub amount: Money,
    /// Share of the period total
    pub percentage: f64,
    pub trend: Trend,
    /// Percentage change against the previous window
    pub change: f64,
    pub previous_amount: Money,
    /// Budgeted amount over the period (expenses only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_amount: Option<Money>,
}

fn totals_by_category(
    transactions: &[Transaction],
    kind: TransactionKind,
    window: DateWindow,
) -> HashMap<CategoryId, Money> {
    let mut totals = HashMap::new();
    for txn in transactions
        .iter()
        .filter(|t| t.kind == kind && window.contains(t.date))
    {
        *totals.entry(txn.category_id).or_insert_with(Money::zero) += txn.amount.abs();
    }
    totals
}

/// Analyse one side of the ledger per category, largest first
pub fn category_analysis(
    storage: &Storage,
    user_id: UserId,
    kind: TransactionKind,
    period: DateRange,
    today: NaiveDate,
) -> FinTrackResult<Vec<CategoryAnalysis>> {
    let window = period.window(today);
    let previous = window.previous();
    let names = CategoryService::new(storage).names(user_id)?;
    let transactions = storage.transactions.get_by_user_in_range(
        user_id,
        Some(previous.start),
        Some(window.end),
    )?;

    let current = totals_by_category(&transactions, kind, window);
    let earlier = totals_by_category(&transactions, kind, previous);
    let total: Money = current.values().copied().sum();

    let mut budgeted: HashMap<CategoryId, Money> = HashMap::new();
    if kind == TransactionKind::Expense {
        for budget in BudgetService::new(storage).list(user_id)? {
            if budget.overlaps(window.start, window.end) {
                *budgeted.entry(budget.category_id).or_insert_with(Money::zero) += budget.amount;
            }
        }
    }

    let mut analysis: Vec<CategoryAnalysis> = current
        .into_iter()
        .map(|(category_id, amount)| {
            let previous_amount = earlier.get(&category_id).copied().unwrap_or_default();
            CategoryAnalysis {
                category: names
                    .get(&category_id)
                    .cloned()
                    .unwrap_or_else(|| UNCATEGORIZED.to_string()),
                amount,
                percentage: round1(amount.percent_of(total).unwrap_or(0.0)),
                trend: Trend::between(previous_amount, amount),
                change: percent_change(previous_amount, amount),
                previous_amount,
                budget_amount: budgeted.get(&category_id).copied(),
            }
        })
        .collect();

    analysis.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });
    Ok(analysis)
}

/// Income and expense totals for one calendar month
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyTotals {
    pub month: MonthPeriod,
    pub income: Money,
    pub expenses: Money,
}

impl MonthlyTotals {
    pub fn balance(&self) -> Money {
        self.income - self.expenses
    }
}

/// Totals for the last `months` calendar months, oldest first, empty months included
pub fn monthly_totals(
    storage: &Storage,
    user_id: UserId,
    months: u32,
    today: NaiveDate,
) -> FinTrackResult<Vec<MonthlyTotals>> {
    let periods = MonthPeriod::last_n(today, months);
    let (Some(first), Some(last)) = (periods.first(), periods.last()) else {
        return Ok(Vec::new());
    };

    let transactions = storage.transactions.get_by_user_in_range(
        user_id,
        Some(first.start_date()),
        Some(last.end_date()),
    )?;

    Ok(periods
        .iter()
        .map(|month| {
            let mut totals = MonthlyTotals {
                month: *month,
                income: Money::zero(),
                expenses: Money::zero(),
            };
            for txn in transactions.iter().filter(|t| month.contains(t.date)) {
                if txn.amount.is_positive() {
                    totals.income += txn.amount;
                } else {
                    totals.expenses += txn.amount.abs();
                }
            }
            totals
        })
        .collect())
}

/// One month of the trends chart
#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    /// `YYYY-MM`
    pub period: String,
    pub income: Money,
    pub expenses: Money,
    pub balance: Money,
    pub savings: Money,
}

/// Monthly trend over the number of months `period` calls for (six by default)
pub fn trends(
    storage: &Storage,
    user_id: UserId,
    period: Option<DateRange>,
    today: NaiveDate,
) -> FinTrackResult<Vec<TrendPoint>> {
    let months = period.map_or(6, |p| p.trend_months());
    Ok(monthly_totals(storage, user_id, months, today)?
        .into_iter()
        .map(|totals| TrendPoint {
            period: totals.month.to_string(),
            income: totals.income,
            expenses: totals.expenses,
            balance: totals.balance(),
            savings: totals.balance().max(Money::zero()),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FinTrackPaths;
    use crate::models::{Budget, Category};
    use chrono::Duration;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = FinTrackPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()
    }

    fn add(storage: &Storage, user: UserId, category: &Category, kind: TransactionKind, cents: i64, days_ago: i64) {
        storage
            .transactions
            .upsert(Transaction::new(
                user,
                category.id,
                kind,
                Money::from_cents(cents),
                today() - Duration::days(days_ago),
            ))
            .unwrap();
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

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(Money::zero(), Money::zero()), 0.0);
        assert_eq!(percent_change(Money::zero(), Money::from_cents(500)), 100.0);
        assert_eq!(percent_change(Money::from_cents(1000), Money::from_cents(1500)), 50.0);
        assert_eq!(percent_change(Money::from_cents(1000), Money::from_cents(250)), -75.0);
        assert_eq!(percent_change(Money::from_cents(-1000), Money::from_cents(-500)), 50.0);
    }

    #[test]
    fn test_summary() {
        let (_temp_dir, storage, user, food, work) = setup();
        add(&storage, user, &work, TransactionKind::Income, 400000, 3);
        add(&storage, user, &food, TransactionKind::Expense, 100000, 2);
        add(&storage, user, &food, TransactionKind::Expense, 777700, 40);

        let summary = ReportSummary::generate(&storage, user, DateRange::Week, today()).unwrap();
        assert_eq!(summary.total_income, Money::from_cents(400000));
        assert_eq!(summary.total_expenses, Money::from_cents(100000));
        assert_eq!(summary.savings_rate, 75.0);
        // 8 days in a trailing week window, both ends counted
        assert_eq!(summary.average_daily_spending, Money::from_cents(12500));
        assert_eq!(summary.budget_compliance, 100.0);
    }

    #[test]
    fn test_budget_compliance() {
        let (_temp_dir, storage, user, food, work) = setup();
        let window = DateRange::Month.window(today());
        let start = window.start;
        storage
            .budgets
            .upsert(Budget::new(user, food.id, "Food", Money::from_cents(5000), start, today()))
            .unwrap();
        storage
            .budgets
            .upsert(Budget::new(user, work.id, "Work", Money::from_cents(5000), start, today()))
            .unwrap();
        add(&storage, user, &food, TransactionKind::Expense, 6000, 1);

        assert_eq!(budget_compliance(&storage, user, window).unwrap(), 50.0);
    }

    #[test]
    fn test_expense_analysis_compares_previous_window() {
        let (_temp_dir, storage, user, food, work) = setup();
        add(&storage, user, &food, TransactionKind::Expense, 3000, 1);
        add(&storage, user, &food, TransactionKind::Expense, 2000, 10);
        add(&storage, user, &work, TransactionKind::Expense, 1000, 2);
        add(&storage, user, &work, TransactionKind::Expense, 4000, 12);
        add(&storage, user, &work, TransactionKind::Income, 99900, 2);

        let analysis =
            category_analysis(&storage, user, TransactionKind::Expense, DateRange::Week, today())
                .unwrap();
        assert_eq!(analysis.len(), 2);

        assert_eq!(analysis[0].category, "Food");
        assert_eq!(analysis[0].amount, Money::from_cents(3000));
        assert_eq!(analysis[0].percentage, 75.0);
        assert_eq!(analysis[0].previous_amount, Money::from_cents(2000));
        assert_eq!(analysis[0].trend, Trend::Up);
        assert_eq!(analysis[0].change, 50.0);

        assert_eq!(analysis[1].category, "Work");
        assert_eq!(analysis[1].trend, Trend::Down);
        assert_eq!(analysis[1].change, -75.0);
        assert!(analysis[1].budget_amount.is_none());
    }

    #[test]
    fn test_income_analysis() {
        let (_temp_dir, storage, user, food, work) = setup();
        add(&storage, user, &work, TransactionKind::Income, 50000, 5);
        add(&storage, user, &food, TransactionKind::Expense, 1000, 5);

        let analysis =
            category_analysis(&storage, user, TransactionKind::Income, DateRange::Month, today())
                .unwrap();
        assert_eq!(analysis.len(), 1);
        assert_eq!(analysis[0].category, "Work");
        assert_eq!(analysis[0].percentage, 100.0);
        assert_eq!(analysis[0].change, 100.0);
    }

    #[test]
    fn test_trends_include_empty_months() {
        let (_temp_dir, storage, user, food, work) = setup();
        add(&storage, user, &work, TransactionKind::Income, 10000, 0);
        add(&storage, user, &food, TransactionKind::Expense, 15000, 0);

        let points = trends(&storage, user, Some(DateRange::Month), today()).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].period, "2025-04");
        assert!(points[0].income.is_zero());
        assert_eq!(points[2].period, "2025-06");
        assert_eq!(points[2].balance, Money::from_cents(-5000));
        assert!(points[2].savings.is_zero());

        assert_eq!(trends(&storage, user, None, today()).unwrap().len(), 6);
    }
}
