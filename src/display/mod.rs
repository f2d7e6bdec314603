//! Terminal display formatting for the management commands

pub mod user;

pub use user::format_user_table;
