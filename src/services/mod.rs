//! Service layer for FinTrack
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, ownership checks, cascades and the derived views the
//! API returns. Every mutation holds `Storage::lock_writes` from its first
//! read to its last save.

pub mod budget;
pub mod category;
pub mod transaction;
pub mod user;

pub use budget::{BudgetService, CreateBudgetInput, UpdateBudgetInput};
pub use category::CategoryService;
pub use transaction::{
    CategoryTotal, CreateTransactionInput, TransactionFilter, TransactionService,
    TransactionStats, TransactionView, UpdateTransactionInput,
};
pub use user::{RegisterInput, UpdateUserInput, UserService};
