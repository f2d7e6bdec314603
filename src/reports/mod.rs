//! Reports module for FinTrack
//!
//! Provides the financial report (totals, top categories, transaction list),
//! period analysis built on it, and file export.

pub mod analysis;
pub mod export;
pub mod financial;

pub use analysis::{
    budget_compliance, category_analysis, monthly_totals, percent_change, trends,
    CategoryAnalysis, MonthlyTotals, ReportSummary, Trend, TrendPoint,
};
pub use export::{export_report, ExportFormat, ExportRange, ExportedReport};
pub use financial::{FinancialReport, ReportCategory, ReportTransaction};
