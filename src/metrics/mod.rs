//! Dashboard and budget metrics
//!
//! Read-only aggregations backing the `/metrics` endpoints.

pub mod budget;
pub mod dashboard;
pub mod insights;

pub use budget::{
    budget_alerts, budget_performance, category_spending_breakdown, AlertKind, AlertSeverity,
    BudgetAlert, BudgetAnalytics, BudgetPerformance, BudgetPeriod, BudgetSummary,
    CategorySpendingBreakdown, SpendingPace,
};
pub use dashboard::{
    budget_overview, category_data, monthly_data, recent_transactions, BudgetOverviewItem,
    BudgetOverviewStats, BudgetStatus, CategorySpending, CompleteDashboard, FinancialSummary,
    MonthlyPoint, RecentTransaction,
};
pub use insights::{generate_insights, Insight, InsightKind};
