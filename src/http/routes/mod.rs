//! Route tables, one module per resource

pub(super) mod auth;
pub(super) mod budgets;
pub(super) mod categories;
pub(super) mod metrics;
pub(super) mod reports;
pub(super) mod transactions;
pub(super) mod users;

use serde::Serialize;

/// Body returned by delete endpoints
#[derive(Debug, Serialize)]
pub(super) struct Deleted {
    success: bool,
    message: String,
}

impl Deleted {
    pub(super) fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
