//! Storage layer for FinTrack
//!
//! Provides JSON file storage with atomic writes and automatic directory
//! creation. Each entity type lives in its own file under `<base>/data/`.

pub mod budgets;
pub mod categories;
pub mod file_io;
pub mod init;
pub mod reload;
pub mod transactions;
pub mod users;

pub use budgets::BudgetRepository;
pub use categories::CategoryRepository;
pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use reload::DataFileWatcher;
pub use transactions::TransactionRepository;
pub use users::UserRepository;

use std::sync::{Mutex, MutexGuard};

use crate::config::paths::FinTrackPaths;
use crate::error::FinTrackError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: FinTrackPaths,
    pub users: UserRepository,
    pub categories: CategoryRepository,
    pub transactions: TransactionRepository,
    pub budgets: BudgetRepository,
    /// Serializes multi-step mutations and reloads
    writes: Mutex<()>,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: FinTrackPaths) -> Result<Self, FinTrackError> {
        paths.ensure_directories()?;

        Ok(Self {
            users: UserRepository::new(paths.users_file()),
            categories: CategoryRepository::new(paths.categories_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            budgets: BudgetRepository::new(paths.budgets_file()),
            paths,
            writes: Mutex::new(()),
        })
    }

    /// Create storage and load everything already on disk
    pub fn open(paths: FinTrackPaths) -> Result<Self, FinTrackError> {
        let storage = Self::new(paths)?;
        storage.load_all()?;
        Ok(storage)
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &FinTrackPaths {
        &self.paths
    }

    /// Hold this while checking and then changing data across repositories
    pub fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, FinTrackError> {
        self.writes
            .lock()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), FinTrackError> {
        self.users.load()?;
        self.categories.load()?;
        self.transactions.load()?;
        self.budgets.load()?;
        Ok(())
    }

    /// Reload from disk without interleaving with an in-flight mutation
    pub fn reload(&self) -> Result<(), FinTrackError> {
        let _guard = self.lock_writes()?;
        self.load_all()
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), FinTrackError> {
        self.users.save()?;
        self.categories.save()?;
        self.transactions.save()?;
        self.budgets.save()?;
        Ok(())
    }

    /// Check if storage has been initialized (has a users file)
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }
}
