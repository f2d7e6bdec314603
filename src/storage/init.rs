//! Storage initialization
//!
//! Handles first-run setup: the data directory and empty data files

use serde_json::json;

use crate::config::paths::FinTrackPaths;
use crate::error::FinTrackError;

use super::file_io::write_json_atomic;

/// Initialize storage for a fresh installation
///
/// Creates the data directory and writes an empty collection for every data
/// file that does not exist yet. Existing files are never touched.
pub fn initialize_storage(paths: &FinTrackPaths) -> Result<Vec<String>, FinTrackError> {
    paths.ensure_directories()?;

    let empty = [
        (paths.users_file(), "users"),
        (paths.categories_file(), "categories"),
        (paths.transactions_file(), "transactions"),
        (paths.budgets_file(), "budgets"),
    ];

    let mut created = Vec::new();
    for (path, key) in empty {
        if !path.exists() {
            write_json_atomic(&path, &json!({ key: [] }))?;
            created.push(path.display().to_string());
        }
    }

    Ok(created)
}

/// Check if storage needs initialization
pub fn needs_initialization(paths: &FinTrackPaths) -> bool {
    paths.data_files().iter().any(|p| !p.exists())
}
