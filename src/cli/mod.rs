//! CLI command handlers
//!
//! This module contains the implementation of the management commands,
//! bridging the clap argument parsing with the service layer.

pub mod report;
pub mod users;

pub use report::{handle_report_command, ReportArgs, ReportFormat};
pub use users::handle_users_command;
