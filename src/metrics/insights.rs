//! Rule-based insights shown beside the dashboard

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::FinTrackResult;
use crate::models::{Money, UserId};
use crate::storage::Storage;

use super::budget::{budget_alerts, AlertKind};
use super::dashboard::{category_data, FinancialSummary};
use crate::services::BudgetService;

/// Next month's spending is predicted as this share of the current month
const PREDICTION_FACTOR: f64 = 1.05;

/// Expenses above this share of income trigger a warning
const HIGH_SPENDING_RATIO: f64 = 0.90;

/// Suggested cut for the largest expense category
const SAVINGS_FACTOR: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Prediction,
    Warning,
    Tip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
    pub confidence: u8,
    pub icon: &'static str,
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Up to three insights: a prediction, a warning and a tip
pub fn generate_insights(
    storage: &Storage,
    user_id: UserId,
    today: NaiveDate,
) -> FinTrackResult<Vec<Insight>> {
    let summary = FinancialSummary::generate(storage, user_id, today)?;
    let mut insights = Vec::new();

    let expenses = summary.monthly_expenses;
    let income = summary.monthly_income;

    if expenses.is_positive() {
        let predicted = expenses.scale(PREDICTION_FACTOR);
        insights.push(Insight {
            kind: InsightKind::Prediction,
            title: "Spending forecast".to_string(),
            message: format!(
                "At your current pace you will spend about {} next month",
                predicted
            ),
            confidence: 75,
            icon: "brain",
            color: "primary",
            amount: Some(predicted),
            category: None,
        });
    }

    let exceeded = budget_alerts(storage, user_id)?
        .into_iter()
        .find(|alert| alert.kind == AlertKind::Exceeded);

    if let Some(alert) = exceeded {
        let budget = BudgetService::new(storage).get(user_id, alert.budget_id)?;
        let over_by = BudgetService::new(storage).spent(&budget)? - budget.amount;
        insights.push(Insight {
            kind: InsightKind::Warning,
            title: "Budget exceeded".to_string(),
            message: format!(
                "You are {} over your {} budget",
                over_by, alert.category
            ),
            confidence: 95,
            icon: "alert-triangle",
            color: "danger",
            amount: Some(over_by),
            category: Some(alert.category),
        });
    } else if income.is_positive() && expenses > income.scale(HIGH_SPENDING_RATIO) {
        insights.push(Insight {
            kind: InsightKind::Warning,
            title: "High spending".to_string(),
            message: format!(
                "You have spent {:.0}% of this month's income",
                expenses.percent_of(income).unwrap_or(0.0)
            ),
            confidence: 85,
            icon: "alert-triangle",
            color: "warning",
            amount: Some(expenses),
            category: None,
        });
    }

    let largest = category_data(storage, user_id, today)?.into_iter().next();
    insights.push(match largest {
        Some(top) => {
            let saving = top.amount.scale(SAVINGS_FACTOR);
            Insight {
                kind: InsightKind::Tip,
                title: "Savings opportunity".to_string(),
                message: format!(
                    "Cutting {} spending by 15% would save {} a month",
                    top.category, saving
                ),
                confidence: 80,
                icon: "lightbulb",
                color: "success",
                amount: Some(saving),
                category: Some(top.category),
            }
        }
        None => Insight {
            kind: InsightKind::Tip,
            title: "Set up budgets".to_string(),
            message: "Create budgets for your main categories to keep spending on track"
                .to_string(),
            confidence: 70,
            icon: "lightbulb",
            color: "info",
            amount: None,
            category: None,
        },
    });

    Ok(insights)
}
