//! Transaction model
//!
//! A single income or expense entry. The stored amount is signed: income is
//! positive, expense negative. The sign always follows the kind.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{CategoryId, TransactionId, UserId};
use super::money::Money;

pub const MAX_DESCRIPTION_LEN: usize = 255;
pub const MAX_NOTES_LEN: usize = 1000;

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Infer the kind from a signed amount; zero has no kind
    pub fn from_amount(amount: Money) -> Option<Self> {
        if amount.is_positive() {
            Some(Self::Income)
        } else if amount.is_negative() {
            Some(Self::Expense)
        } else {
            None
        }
    }

    /// Give `amount` the sign this kind requires
    pub fn apply_sign(&self, amount: Money) -> Money {
        match self {
            Self::Income => amount.abs(),
            Self::Expense => -amount.abs(),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = TransactionValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(TransactionValidationError::UnknownKind(other.to_string())),
        }
    }
}

/// A financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Owning user
    pub user_id: UserId,

    /// Category, always owned by the same user
    pub category_id: CategoryId,

    pub kind: TransactionKind,

    /// Signed amount (positive for income, negative for expense)
    pub amount: Money,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub notes: Option<String>,

    /// Transaction date
    pub date: NaiveDate,

    /// When the transaction was created
    pub created_at: DateTime<Utc>,

    /// When the transaction was last modified
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction; the amount's sign is taken from `kind`
    pub fn new(
        user_id: UserId,
        category_id: CategoryId,
        kind: TransactionKind,
        amount: Money,
        date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            user_id,
            category_id,
            kind,
            amount: kind.apply_sign(amount),
            description: String::new(),
            notes: None,
            date,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Change kind and amount together, keeping the sign rule
    pub fn set_amount(&mut self, kind: TransactionKind, amount: Money) {
        self.kind = kind;
        self.amount = kind.apply_sign(amount);
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Inclusive date range check
    pub fn in_range(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
        start.map_or(true, |s| self.date >= s) && end.map_or(true, |e| self.date <= e)
    }

    /// Validate the transaction
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if self.amount.is_zero() {
            return Err(TransactionValidationError::ZeroAmount);
        }

        if TransactionKind::from_amount(self.amount) != Some(self.kind) {
            return Err(TransactionValidationError::SignMismatch(self.kind));
        }

        let len = self.description.chars().count();
        if len > MAX_DESCRIPTION_LEN {
            return Err(TransactionValidationError::DescriptionTooLong(len));
        }

        if let Some(notes) = &self.notes {
            let len = notes.chars().count();
            if len > MAX_NOTES_LEN {
                return Err(TransactionValidationError::NotesTooLong(len));
            }
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.date, self.description, self.amount)
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    ZeroAmount,
    SignMismatch(TransactionKind),
    DescriptionTooLong(usize),
    NotesTooLong(usize),
    UnknownKind(String),
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroAmount => write!(f, "Transaction amount cannot be zero"),
            Self::SignMismatch(kind) => {
                write!(f, "Amount sign does not match transaction type '{}'", kind)
            }
            Self::DescriptionTooLong(len) => write!(
                f,
                "Description too long ({} chars, max {})",
                len, MAX_DESCRIPTION_LEN
            ),
            Self::NotesTooLong(len) => {
                write!(f, "Notes too long ({} chars, max {})", len, MAX_NOTES_LEN)
            }
            Self::UnknownKind(kind) => {
                write!(f, "Unknown transaction type '{}' (expected income or expense)", kind)
            }
        }
    }
}

impl std::error::Error for TransactionValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sign_follows_kind() {
        let expense = Transaction::new(
            UserId::new(),
            CategoryId::new(),
            TransactionKind::Expense,
            Money::from_cents(3000),
            date(2025, 1, 15),
        );
        assert_eq!(expense.amount.cents(), -3000);

        let income = Transaction::new(
            UserId::new(),
            CategoryId::new(),
            TransactionKind::Income,
            Money::from_cents(-5000),
            date(2025, 1, 15),
        );
        assert_eq!(income.amount.cents(), 5000);
        assert!(income.validate().is_ok());
    }

    #[test]
    fn test_kind_from_amount() {
        assert_eq!(
            TransactionKind::from_amount(Money::from_cents(1)),
            Some(TransactionKind::Income)
        );
        assert_eq!(
            TransactionKind::from_amount(Money::from_cents(-1)),
            Some(TransactionKind::Expense)
        );
        assert_eq!(TransactionKind::from_amount(Money::zero()), None);
    }

    #[test]
    fn test_kind_parse_and_serde() {
        assert_eq!("Income".parse::<TransactionKind>(), Ok(TransactionKind::Income));
        assert!("transfer".parse::<TransactionKind>().is_err());
        assert_eq!(
            serde_json::to_string(&TransactionKind::Expense).unwrap(),
            "\"expense\""
        );
    }

    #[test]
    fn test_set_amount_renormalises() {
        let mut txn = Transaction::new(
            UserId::new(),
            CategoryId::new(),
            TransactionKind::Expense,
            Money::from_cents(1000),
            date(2025, 3, 1),
        );
        txn.set_amount(TransactionKind::Income, Money::from_cents(-250));
        assert_eq!(txn.amount.cents(), 250);
        assert!(txn.is_income());
    }

    #[test]
    fn test_validation() {
        let mut txn = Transaction::new(
            UserId::new(),
            CategoryId::new(),
            TransactionKind::Expense,
            Money::zero(),
            date(2025, 3, 1),
        );
        assert_eq!(txn.validate(), Err(TransactionValidationError::ZeroAmount));

        txn.set_amount(TransactionKind::Expense, Money::from_cents(100));
        txn.description = "x".repeat(256);
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::DescriptionTooLong(256))
        );

        txn.description = "ok".into();
        txn.amount = Money::from_cents(100);
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::SignMismatch(TransactionKind::Expense))
        );
    }

    #[test]
    fn test_in_range_is_inclusive() {
        let txn = Transaction::new(
            UserId::new(),
            CategoryId::new(),
            TransactionKind::Income,
            Money::from_cents(100),
            date(2025, 3, 10),
        );
        assert!(txn.in_range(Some(date(2025, 3, 10)), Some(date(2025, 3, 10))));
        assert!(txn.in_range(None, None));
        assert!(!txn.in_range(Some(date(2025, 3, 11)), None));
        assert!(!txn.in_range(None, Some(date(2025, 3, 9))));
    }
}
