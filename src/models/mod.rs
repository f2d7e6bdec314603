//! Core data models for FinTrack
//!
//! This module contains the data structures of the finance domain: users,
//! categories, transactions and budgets, plus the money and period value types
//! they are built from.

pub mod budget;
pub mod category;
pub mod ids;
pub mod money;
pub mod period;
pub mod transaction;
pub mod user;

pub use budget::Budget;
pub use category::Category;
pub use ids::{BudgetId, CategoryId, TransactionId, UserId};
pub use money::Money;
pub use period::{DateRange, DateWindow, MonthPeriod};
pub use transaction::{Transaction, TransactionKind};
pub use user::{User, UserProfile};
