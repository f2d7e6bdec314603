//! CLI command listing registered users

use crate::display::format_user_table;
use crate::error::FinTrackResult;
use crate::services::UserService;
use crate::storage::Storage;

/// Print every registered user
pub fn handle_users_command(storage: &Storage) -> FinTrackResult<()> {
    let users = UserService::new(storage).list()?;
    println!("{}", format_user_table(&users));
    Ok(())
}
