//! Budget health metrics
//!
//! Alerts for budgets near or over their limit, portfolio totals,
//! per-period analytics and spending pace. All figures use each budget's
//! full window unless a period is given.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{FinTrackError, FinTrackResult};
use crate::models::{Budget, BudgetId, CategoryId, DateWindow, Money, MonthPeriod, UserId};
use crate::reports::analysis::round1;
use crate::services::{BudgetService, CategoryService};
use crate::storage::Storage;

/// Pace band around the expected spending, as a fraction
const PACE_TOLERANCE: f64 = 0.10;

/// Alerts at or above this percentage are `medium` rather than `low`
const MEDIUM_SEVERITY_PERCENT: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Exceeded,
    Warning,
}

/// A budget that needs attention
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAlert {
    pub id: String,
    pub budget_id: BudgetId,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub category: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub dismissed: bool,
}

/// A budget paired with what has been spent against it
struct Measured {
    budget: Budget,
    category: String,
    spent: Money,
}

fn measure_all(storage: &Storage, user_id: UserId) -> FinTrackResult<Vec<Measured>> {
    let service = BudgetService::new(storage);
    let names = CategoryService::new(storage).names(user_id)?;

    service
        .list(user_id)?
        .into_iter()
        .map(|budget| -> FinTrackResult<Measured> {
            let spent = service.spent(&budget)?;
            let category = names
                .get(&budget.category_id)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string());
            Ok(Measured {
                budget,
                category,
                spent,
            })
        })
        .collect()
}

/// Alerts for every budget over its limit or past its alert threshold, most severe first
pub fn budget_alerts(storage: &Storage, user_id: UserId) -> FinTrackResult<Vec<BudgetAlert>> {
    let mut alerts: Vec<BudgetAlert> = measure_all(storage, user_id)?
        .into_iter()
        .filter_map(|m| alert_for(&m))
        .collect();
    alerts.sort_by_key(|a| a.severity);
    Ok(alerts)
}

fn alert_for(m: &Measured) -> Option<BudgetAlert> {
    let percentage = m.spent.percent_of(m.budget.amount).unwrap_or(0.0);

    if m.spent > m.budget.amount {
        Some(BudgetAlert {
            id: format!("alert-{}-exceeded", m.budget.id.as_uuid()),
            budget_id: m.budget.id,
            kind: AlertKind::Exceeded,
            category: m.category.clone(),
            message: format!(
                "You have exceeded the budget by {}",
                m.spent - m.budget.amount
            ),
            severity: AlertSeverity::High,
            dismissed: false,
        })
    } else if percentage >= m.budget.alert_threshold {
        Some(BudgetAlert {
            id: format!("alert-{}-warning", m.budget.id.as_uuid()),
            budget_id: m.budget.id,
            kind: AlertKind::Warning,
            category: m.category.clone(),
            message: format!(
                "You have used {:.0}% of your budget ({} of {})",
                percentage, m.spent, m.budget.amount
            ),
            severity: if percentage >= MEDIUM_SEVERITY_PERCENT {
                AlertSeverity::Medium
            } else {
                AlertSeverity::Low
            },
            dismissed: false,
        })
    } else {
        None
    }
}

/// Totals across all of a user's budgets
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub total_budget: Money,
    pub total_spent: Money,
    /// May be negative when budgets are overspent
    pub available: Money,
    pub percentage_used: f64,
    pub budgets_exceeded: usize,
    pub total_budgets: usize,
}

impl BudgetSummary {
    pub fn generate(storage: &Storage, user_id: UserId) -> FinTrackResult<Self> {
        let measured = measure_all(storage, user_id)?;

        let total_budget: Money = measured.iter().map(|m| m.budget.amount).sum();
        let total_spent: Money = measured.iter().map(|m| m.spent).sum();

        Ok(Self {
            total_budget,
            total_spent,
            available: total_budget - total_spent,
            percentage_used: round1(total_spent.percent_of(total_budget).unwrap_or(0.0)),
            budgets_exceeded: measured
                .iter()
                .filter(|m| m.spent > m.budget.amount)
                .count(),
            total_budgets: measured.len(),
        })
    }
}

/// Period names accepted by budget analytics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// The last seven days
    Weekly,
    /// The calendar month
    #[default]
    Monthly,
    /// The calendar quarter
    Quarterly,
    /// The calendar year
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    pub fn window(&self, today: NaiveDate) -> DateWindow {
        match self {
            Self::Weekly => DateWindow::new(today - Duration::days(7), today),
            Self::Monthly => MonthPeriod::containing(today).window(),
            Self::Quarterly => DateWindow::quarter_containing(today),
            Self::Yearly => DateWindow::year_containing(today),
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetPeriod {
    type Err = FinTrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            other => Err(FinTrackError::Validation(format!(
                "Unknown period '{}' (expected weekly, monthly, quarterly or yearly)",
                other
            ))),
        }
    }
}

/// Expense total for one category inside an analytics window
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpendingBreakdown {
    pub category_id: CategoryId,
    pub category_name: String,
    pub total_spent: Money,
    pub transaction_count: usize,
    pub budget_amount: Option<Money>,
    pub percentage_of_budget: Option<f64>,
}

/// Expenses per category over `window`, largest first, with any overlapping budget
pub fn category_spending_breakdown(
    storage: &Storage,
    user_id: UserId,
    window: DateWindow,
) -> FinTrackResult<Vec<CategorySpendingBreakdown>> {
    let names = CategoryService::new(storage).names(user_id)?;

    let mut totals: HashMap<CategoryId, (Money, usize)> = HashMap::new();
    for txn in storage.transactions.get_by_user_in_range(
        user_id,
        Some(window.start),
        Some(window.end),
    )? {
        if txn.is_expense() {
            let entry = totals.entry(txn.category_id).or_insert((Money::zero(), 0));
            entry.0 += txn.amount.abs();
            entry.1 += 1;
        }
    }

    let mut budgeted: HashMap<CategoryId, Money> = HashMap::new();
    for budget in BudgetService::new(storage).list(user_id)? {
        if budget.overlaps(window.start, window.end) {
            *budgeted.entry(budget.category_id).or_default() += budget.amount;
        }
    }

    let mut breakdown: Vec<CategorySpendingBreakdown> = totals
        .into_iter()
        .map(|(category_id, (total_spent, transaction_count))| {
            let budget_amount = budgeted.get(&category_id).copied();
            CategorySpendingBreakdown {
                category_id,
                category_name: names.get(&category_id).cloned().unwrap_or_default(),
                total_spent,
                transaction_count,
                budget_amount,
                percentage_of_budget: budget_amount
                    .and_then(|amount| total_spent.percent_of(amount))
                    .map(round1),
            }
        })
        .collect();
    breakdown.sort_by(|a, b| {
        b.total_spent
            .cmp(&a.total_spent)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });
    Ok(breakdown)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsTrends {
    pub spending_trend: String,
    /// Unspent share of the total budget
    pub savings_rate: f64,
}

/// Budget overview, category breakdown and alerts for one period
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAnalytics {
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub overview: BudgetSummary,
    pub category_breakdown: Vec<CategorySpendingBreakdown>,
    pub alerts: Vec<BudgetAlert>,
    pub trends: AnalyticsTrends,
}

impl BudgetAnalytics {
    pub fn generate(
        storage: &Storage,
        user_id: UserId,
        period: BudgetPeriod,
        today: NaiveDate,
    ) -> FinTrackResult<Self> {
        let window = period.window(today);
        let overview = BudgetSummary::generate(storage, user_id)?;

        let savings_rate = if overview.total_budget.is_positive() {
            round1(
                overview
                    .available
                    .percent_of(overview.total_budget)
                    .unwrap_or(0.0),
            )
        } else {
            0.0
        };

        Ok(Self {
            period,
            start_date: window.start,
            end_date: window.end,
            category_breakdown: category_spending_breakdown(storage, user_id, window)?,
            alerts: budget_alerts(storage, user_id)?,
            overview,
            trends: AnalyticsTrends {
                spending_trend: "stable".to_string(),
                savings_rate,
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendingPace {
    OverPace,
    UnderPace,
    OnTrack,
}

impl SpendingPace {
    /// Compare actual against expected spending with a ±10% band
    pub fn classify(spent: Money, expected: Money) -> Self {
        if spent > expected.scale(1.0 + PACE_TOLERANCE) {
            Self::OverPace
        } else if spent < expected.scale(1.0 - PACE_TOLERANCE) {
            Self::UnderPace
        } else {
            Self::OnTrack
        }
    }
}

/// Progress of one budget through its window
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPerformance {
    pub budget_id: BudgetId,
    pub category_name: String,
    pub budget_amount: Money,
    pub spent_amount: Money,
    pub percentage_used: f64,
    pub days_remaining: i64,
    pub days_total: i64,
    /// Linear share of the budget for the days elapsed so far
    pub expected_spending: Money,
    pub spending_pace: SpendingPace,
    pub is_active: bool,
}

pub fn budget_performance(
    storage: &Storage,
    user_id: UserId,
    today: NaiveDate,
) -> FinTrackResult<Vec<BudgetPerformance>> {
    Ok(measure_all(storage, user_id)?
        .into_iter()
        .map(|m| {
            let days_total = m.budget.days_total();
            let days_elapsed = ((today - m.budget.start_date).num_days() + 1).clamp(0, days_total);
            let expected = m
                .budget
                .amount
                .scale(days_elapsed as f64 / days_total.max(1) as f64);

            BudgetPerformance {
                budget_id: m.budget.id,
                category_name: m.category,
                budget_amount: m.budget.amount,
                spent_amount: m.spent,
                percentage_used: round1(m.spent.percent_of(m.budget.amount).unwrap_or(0.0)),
                days_remaining: (m.budget.end_date - today).num_days().max(0),
                days_total,
                expected_spending: expected,
                spending_pace: SpendingPace::classify(m.spent, expected),
                is_active: m.budget.contains(today),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FinTrackPaths;
    use crate::models::{Category, Transaction, TransactionKind};
    use tempfile::TempDir;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).unwrap()
    }

    struct Fixture {
        _temp_dir: TempDir,
        storage: Storage,
        user: UserId,
    }

    impl Fixture {
        fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();
            let paths = FinTrackPaths::with_base_dir(temp_dir.path().to_path_buf());
            let storage = Storage::new(paths).unwrap();
            Self {
                _temp_dir: temp_dir,
                storage,
                user: UserId::new(),
            }
        }

        fn category(&self, name: &str) -> Category {
            let category = Category::new(self.user, name);
            self.storage.categories.upsert(category.clone()).unwrap();
            category
        }

        fn budget(&self, category: &Category, cents: i64, start: NaiveDate, end: NaiveDate) -> Budget {
            let budget = Budget::new(self.user, category.id, &category.name, Money::from_cents(cents), start, end);
            self.storage.budgets.upsert(budget.clone()).unwrap();
            budget
        }

        fn spend(&self, category: &Category, cents: i64, on: NaiveDate) {
            self.storage
                .transactions
                .upsert(Transaction::new(self.user, category.id, TransactionKind::Expense, Money::from_cents(cents), on))
                .unwrap();
        }
    }

    #[test]
    fn test_alerts_sorted_by_severity() {
        let f = Fixture::new();
        let food = f.category("Food");
        let fun = f.category("Leisure");
        let bills = f.category("Bills");
        let travel = f.category("Travel");

        f.budget(&food, 10000, date(3, 1), date(3, 31));
        f.budget(&fun, 10000, date(3, 1), date(3, 31));
        let over = f.budget(&bills, 10000, date(3, 1), date(3, 31));
        f.budget(&travel, 10000, date(3, 1), date(3, 31));

        f.spend(&food, 8500, date(3, 2));
        f.spend(&fun, 9500, date(3, 2));
        f.spend(&bills, 10001, date(3, 2));
        f.spend(&travel, 1000, date(3, 2));

        let alerts = budget_alerts(&f.storage, f.user).unwrap();
        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0].severity, AlertSeverity::High);
        assert_eq!(alerts[0].kind, AlertKind::Exceeded);
        assert_eq!(alerts[0].id, format!("alert-{}-exceeded", over.id.as_uuid()));
        assert_eq!(alerts[1].severity, AlertSeverity::Medium);
        assert_eq!(alerts[1].category, "Leisure");
        assert_eq!(alerts[2].severity, AlertSeverity::Low);
        assert_eq!(alerts[2].category, "Food");
    }

    #[test]
    fn test_alert_threshold_is_per_budget() {
        let f = Fixture::new();
        let food = f.category("Food");
        let mut budget = f.budget(&food, 10000, date(3, 1), date(3, 31));
        budget.alert_threshold = 50.0;
        f.storage.budgets.upsert(budget).unwrap();
        f.spend(&food, 5000, date(3, 2));

        let alerts = budget_alerts(&f.storage, f.user).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Warning);
    }

    #[test]
    fn test_summary() {
        let f = Fixture::new();
        let food = f.category("Food");
        let bills = f.category("Bills");
        f.budget(&food, 20000, date(3, 1), date(3, 31));
        f.budget(&bills, 10000, date(3, 1), date(3, 31));
        f.spend(&food, 5000, date(3, 2));
        f.spend(&bills, 15000, date(3, 2));

        let summary = BudgetSummary::generate(&f.storage, f.user).unwrap();
        assert_eq!(summary.total_budget, Money::from_cents(30000));
        assert_eq!(summary.total_spent, Money::from_cents(20000));
        assert_eq!(summary.available, Money::from_cents(10000));
        assert_eq!(summary.percentage_used, 66.7);
        assert_eq!(summary.budgets_exceeded, 1);
        assert_eq!(summary.total_budgets, 2);
    }

    #[test]
    fn test_period_windows() {
        let today = date(5, 20);
        assert_eq!(BudgetPeriod::Weekly.window(today), DateWindow::new(date(5, 13), today));
        assert_eq!(BudgetPeriod::Monthly.window(today), DateWindow::new(date(5, 1), date(5, 31)));
        assert_eq!(BudgetPeriod::Quarterly.window(today), DateWindow::new(date(4, 1), date(6, 30)));
        assert_eq!(BudgetPeriod::Yearly.window(today), DateWindow::new(date(1, 1), date(12, 31)));
        assert!("fortnightly".parse::<BudgetPeriod>().is_err());
    }

    #[test]
    fn test_analytics() {
        let f = Fixture::new();
        let food = f.category("Food");
        let bills = f.category("Bills");
        f.budget(&food, 20000, date(5, 1), date(5, 31));
        f.spend(&food, 5000, date(5, 2));
        f.spend(&food, 1000, date(5, 3));
        f.spend(&bills, 3000, date(5, 4));
        f.spend(&bills, 9999, date(4, 4));

        let analytics = BudgetAnalytics::generate(&f.storage, f.user, BudgetPeriod::Monthly, date(5, 20)).unwrap();
        assert_eq!(analytics.start_date, date(5, 1));
        assert_eq!(analytics.category_breakdown.len(), 2);

        let food_row = &analytics.category_breakdown[0];
        assert_eq!(food_row.category_name, "Food");
        assert_eq!(food_row.transaction_count, 2);
        assert_eq!(food_row.percentage_of_budget, Some(30.0));

        let bills_row = &analytics.category_breakdown[1];
        assert!(bills_row.budget_amount.is_none());
        assert_eq!(analytics.trends.savings_rate, 70.0);
    }

    #[test]
    fn test_performance_pace() {
        let f = Fixture::new();
        let food = f.category("Food");
        let bills = f.category("Bills");
        let travel = f.category("Travel");
        // 10 day windows, day 5 of 10 on the 5th
        f.budget(&food, 10000, date(6, 1), date(6, 10));
        f.budget(&bills, 10000, date(6, 1), date(6, 10));
        f.budget(&travel, 10000, date(6, 1), date(6, 10));
        f.spend(&food, 8000, date(6, 2));
        f.spend(&bills, 2000, date(6, 2));
        f.spend(&travel, 5000, date(6, 2));

        let performance = budget_performance(&f.storage, f.user, date(6, 5)).unwrap();
        let pace = |name: &str| {
            performance
                .iter()
                .find(|p| p.category_name == name)
                .unwrap()
                .clone()
        };

        let food_perf = pace("Food");
        assert_eq!(food_perf.days_total, 10);
        assert_eq!(food_perf.days_remaining, 5);
        assert_eq!(food_perf.expected_spending, Money::from_cents(5000));
        assert_eq!(food_perf.spending_pace, SpendingPace::OverPace);
        assert!(food_perf.is_active);

        assert_eq!(pace("Bills").spending_pace, SpendingPace::UnderPace);
        assert_eq!(pace("Travel").spending_pace, SpendingPace::OnTrack);

        let later = budget_performance(&f.storage, f.user, date(7, 1)).unwrap();
        assert!(later.iter().all(|p| !p.is_active && p.days_remaining == 0));
    }
}
