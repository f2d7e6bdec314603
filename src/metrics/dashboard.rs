//! Dashboard metrics
//!
//! The figures behind the dashboard cards and charts: balance and monthly
//! comparisons, month-by-month totals, current month spending by category,
//! the latest transactions and the state of this month's budgets.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{FinTrackError, FinTrackResult};
use crate::models::{
    BudgetId, CategoryId, Money, MonthPeriod, TransactionId, TransactionKind, UserId,
};
use crate::reports::analysis::round1;
use crate::reports::monthly_totals;
use crate::services::{BudgetService, CategoryService};
use crate::storage::Storage;

pub const MAX_MONTHS: u32 = 24;
pub const DEFAULT_MONTHS: u32 = 6;
pub const MAX_RECENT: usize = 50;
pub const DEFAULT_RECENT: usize = 10;

/// Percentage of the limit from which a budget shows as `warning`
pub const WARNING_PERCENT: f64 = 80.0;

/// Month-over-month change as a signed percentage string, e.g. `+12.5%`
pub fn format_change(current: Money, previous: Money) -> String {
    if previous.is_zero() {
        return if current.is_zero() {
            "0.0%".to_string()
        } else {
            "+100.0%".to_string()
        };
    }
    let change = (current - previous).percent_of(previous.abs()).unwrap_or(0.0);
    format!("{:+.1}%", change)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryChanges {
    pub balance: String,
    pub income: String,
    pub expenses: String,
    pub savings: String,
}

/// Figures for the four dashboard cards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    /// Sum of every transaction ever recorded
    pub total_balance: Money,
    pub monthly_income: Money,
    pub monthly_expenses: Money,
    /// The balance, floored at zero
    pub saving: Money,
    pub changes: SummaryChanges,
}

impl FinancialSummary {
    pub fn generate(storage: &Storage, user_id: UserId, today: NaiveDate) -> FinTrackResult<Self> {
        let transactions = storage.transactions.get_by_user(user_id)?;
        let current = MonthPeriod::containing(today);
        let previous = current.prev();

        let mut total_balance = Money::zero();
        let (mut income, mut expenses) = (Money::zero(), Money::zero());
        let (mut previous_income, mut previous_expenses) = (Money::zero(), Money::zero());

        for txn in &transactions {
            total_balance += txn.amount;
            let (inc, exp) = if current.contains(txn.date) {
                (&mut income, &mut expenses)
            } else if previous.contains(txn.date) {
                (&mut previous_income, &mut previous_expenses)
            } else {
                continue;
            };
            if txn.amount.is_positive() {
                *inc += txn.amount;
            } else {
                *exp += txn.amount.abs();
            }
        }

        let saving = total_balance.max(Money::zero());
        let balance_before = total_balance - (income - expenses);

        Ok(Self {
            total_balance,
            monthly_income: income,
            monthly_expenses: expenses,
            saving,
            changes: SummaryChanges {
                balance: format_change(total_balance, balance_before),
                income: format_change(income, previous_income),
                expenses: format_change(expenses, previous_expenses),
                savings: format_change(saving, balance_before.max(Money::zero())),
            },
        })
    }
}

/// One month of the income/expense chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    /// Short month name
    pub month: &'static str,
    pub year: i32,
    pub incomes: Money,
    pub expenses: Money,
    pub balance: Money,
}

/// Totals for the last `months` calendar months (1 to 24), oldest first
pub fn monthly_data(
    storage: &Storage,
    user_id: UserId,
    months: u32,
    today: NaiveDate,
) -> FinTrackResult<Vec<MonthlyPoint>> {
    if !(1..=MAX_MONTHS).contains(&months) {
        return Err(FinTrackError::Validation(format!(
            "Months parameter must be between 1 and {}",
            MAX_MONTHS
        )));
    }

    Ok(monthly_totals(storage, user_id, months, today)?
        .into_iter()
        .map(|totals| MonthlyPoint {
            month: totals.month.label(),
            year: totals.month.year(),
            incomes: totals.income,
            expenses: totals.expenses,
            balance: totals.balance(),
        })
        .collect())
}

/// Spending in one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpending {
    pub category: String,
    pub amount: Money,
}

/// Current month expenses per category, largest first
pub fn category_data(
    storage: &Storage,
    user_id: UserId,
    today: NaiveDate,
) -> FinTrackResult<Vec<CategorySpending>> {
    let names = CategoryService::new(storage).names(user_id)?;
    let month = MonthPeriod::containing(today);

    let mut totals: HashMap<CategoryId, Money> = HashMap::new();
    for txn in storage.transactions.get_by_user_in_range(
        user_id,
        Some(month.start_date()),
        Some(month.end_date()),
    )? {
        if txn.is_expense() {
            *totals.entry(txn.category_id).or_default() += txn.amount.abs();
        }
    }

    let mut data: Vec<CategorySpending> = totals
        .into_iter()
        .filter_map(|(id, amount)| {
            names.get(&id).map(|name| CategorySpending {
                category: name.clone(),
                amount,
            })
        })
        .collect();
    data.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });
    Ok(data)
}

/// A row of the dashboard's transaction list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentTransaction {
    pub id: TransactionId,
    pub description: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

/// The `limit` (1 to 50) newest transactions
pub fn recent_transactions(
    storage: &Storage,
    user_id: UserId,
    limit: usize,
) -> FinTrackResult<Vec<RecentTransaction>> {
    if !(1..=MAX_RECENT).contains(&limit) {
        return Err(FinTrackError::Validation(format!(
            "Limit parameter must be between 1 and {}",
            MAX_RECENT
        )));
    }

    let names = CategoryService::new(storage).names(user_id)?;
    Ok(storage
        .transactions
        .get_by_user(user_id)?
        .into_iter()
        .take(limit)
        .map(|txn| RecentTransaction {
            category: names.get(&txn.category_id).cloned().unwrap_or_default(),
            id: txn.id,
            description: txn.description,
            amount: txn.amount,
            date: txn.date,
            kind: txn.kind,
        })
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Good,
    Warning,
    Over,
}

impl BudgetStatus {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage > 100.0 {
            Self::Over
        } else if percentage >= WARNING_PERCENT {
            Self::Warning
        } else {
            Self::Good
        }
    }
}

/// One budget's progress this month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetOverviewItem {
    pub budget_id: BudgetId,
    pub category: String,
    pub spent: Money,
    pub budget: Money,
    pub percentage: f64,
    /// Never negative
    pub remaining: Money,
    pub status: BudgetStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BudgetOverviewStats {
    pub total_budgets: usize,
    pub over_budget_count: usize,
    pub warning_budget_count: usize,
    pub good_budget_count: usize,
}

impl BudgetOverviewStats {
    pub fn from_items(items: &[BudgetOverviewItem]) -> Self {
        let count = |status: BudgetStatus| items.iter().filter(|i| i.status == status).count();
        Self {
            total_budgets: items.len(),
            over_budget_count: count(BudgetStatus::Over),
            warning_budget_count: count(BudgetStatus::Warning),
            good_budget_count: count(BudgetStatus::Good),
        }
    }
}

/// Budgets overlapping the current month, with spending from the 1st to today
pub fn budget_overview(
    storage: &Storage,
    user_id: UserId,
    today: NaiveDate,
) -> FinTrackResult<Vec<BudgetOverviewItem>> {
    let service = BudgetService::new(storage);
    let names = CategoryService::new(storage).names(user_id)?;
    let month_start = MonthPeriod::containing(today).start_date();

    let mut items = Vec::new();
    for budget in service.list(user_id)? {
        if !budget.overlaps(month_start, today) {
            continue;
        }
        let spent = service.spent_between(
            &budget,
            budget.start_date.max(month_start),
            budget.end_date.min(today),
        )?;
        let percentage = spent.percent_of(budget.amount).unwrap_or(0.0);

        items.push(BudgetOverviewItem {
            budget_id: budget.id,
            category: names
                .get(&budget.category_id)
                .cloned()
                .unwrap_or_else(|| budget.name.clone()),
            spent,
            budget: budget.amount,
            percentage: round1(percentage),
            remaining: (budget.amount - spent).max(Money::zero()),
            status: BudgetStatus::from_percentage(percentage),
        });
    }
    Ok(items)
}

/// Every dashboard block in one payload
#[derive(Debug, Clone, Serialize)]
pub struct CompleteDashboard {
    pub financial_summary: FinancialSummary,
    pub monthly_chart: Vec<MonthlyPoint>,
    pub category_chart: Vec<CategorySpending>,
    pub recent_transactions: Vec<RecentTransaction>,
    pub budget_overview: Vec<BudgetOverviewItem>,
}

impl CompleteDashboard {
    pub fn generate(storage: &Storage, user_id: UserId, today: NaiveDate) -> FinTrackResult<Self> {
        Ok(Self {
            financial_summary: FinancialSummary::generate(storage, user_id, today)?,
            monthly_chart: monthly_data(storage, user_id, DEFAULT_MONTHS, today)?,
            category_chart: category_data(storage, user_id, today)?,
            recent_transactions: recent_transactions(storage, user_id, DEFAULT_RECENT)?,
            budget_overview: budget_overview(storage, user_id, today)?,
        })
    }
}
