//! Budget model
//!
//! A spending limit for one category over an inclusive date window.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BudgetId, CategoryId, UserId};
use super::money::Money;

/// Percentage of the limit at which a budget starts warning
pub const DEFAULT_ALERT_THRESHOLD: f64 = 80.0;

pub const MAX_NAME_LEN: usize = 100;

/// A category spending limit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    /// Unique identifier
    pub id: BudgetId,

    /// Owning user
    pub user_id: UserId,

    /// The category this budget limits
    pub category_id: CategoryId,

    /// Display name, usually the category name
    pub name: String,

    /// Spending limit (positive)
    pub amount: Money,

    /// First day covered
    pub start_date: NaiveDate,

    /// Last day covered (inclusive)
    pub end_date: NaiveDate,

    /// Warn once spending reaches this percentage of `amount`
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: f64,

    /// When the budget was created
    pub created_at: DateTime<Utc>,

    /// When the budget was last modified
    pub updated_at: DateTime<Utc>,
}

fn default_alert_threshold() -> f64 {
    DEFAULT_ALERT_THRESHOLD
}

impl Budget {
    /// Create a new budget
    pub fn new(
        user_id: UserId,
        category_id: CategoryId,
        name: impl Into<String>,
        amount: Money,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: BudgetId::new(),
            user_id,
            category_id,
            name: name.into(),
            amount,
            start_date,
            end_date,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Whether `date` falls inside the budget window
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Whether the budget window shares at least one day with `[start, end]`
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }

    /// Number of days covered, counting both ends
    pub fn days_total(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Validate the budget
    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if self.name.trim().is_empty() {
            return Err(BudgetValidationError::EmptyName);
        }

        let len = self.name.chars().count();
        if len > MAX_NAME_LEN {
            return Err(BudgetValidationError::NameTooLong(len));
        }

        if !self.amount.is_positive() {
            return Err(BudgetValidationError::NonPositiveAmount);
        }

        if self.start_date > self.end_date {
            return Err(BudgetValidationError::InvertedDates {
                start: self.start_date,
                end: self.end_date,
            });
        }

        if !(self.alert_threshold > 0.0 && self.alert_threshold <= 100.0) {
            return Err(BudgetValidationError::ThresholdOutOfRange(
                self.alert_threshold,
            ));
        }

        Ok(())
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({} to {})",
            self.name, self.amount, self.start_date, self.end_date
        )
    }
}

/// Validation errors for budgets
#[derive(Debug, Clone, PartialEq)]
pub enum BudgetValidationError {
    EmptyName,
    NameTooLong(usize),
    NonPositiveAmount,
    InvertedDates { start: NaiveDate, end: NaiveDate },
    ThresholdOutOfRange(f64),
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Budget name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Budget name too long ({} chars, max {})", len, MAX_NAME_LEN)
            }
            Self::NonPositiveAmount => write!(f, "Budget amount must be greater than zero"),
            Self::InvertedDates { start, end } => write!(
                f,
                "start_date ({}) must be on or before end_date ({})",
                start, end
            ),
            Self::ThresholdOutOfRange(value) => write!(
                f,
                "alert_threshold must be greater than 0 and at most 100 (got {})",
                value
            ),
        }
    }
}

impl std::error::Error for BudgetValidationError {}
