//! FinTrack - personal finance tracking HTTP API
//!
//! This library provides the core functionality behind the `fintrack` server:
//! users with bearer-token authentication, categories, income and expense
//! transactions, budgets, financial reports and dashboard metrics, persisted
//! as JSON files.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Data directory resolution and server settings
//! - `error`: Custom error types
//! - `models`: Core data models (users, categories, transactions, budgets, money)
//! - `storage`: JSON file storage layer
//! - `auth`: Password hashing and access tokens
//! - `services`: Business logic layer
//! - `reports`: Financial reports, period analysis and export
//! - `metrics`: Dashboard and budget health metrics
//! - `http`: The axum router and handlers
//! - `server`: Logging setup and the server runtime
//! - `cli`, `display`: Management commands
//!
//! # Example
//!
//! ```rust,ignore
//! use fintrack::config::{paths::FinTrackPaths, settings::Settings};
//!
//! let paths = FinTrackPaths::new()?;
//! let settings = Settings::load(&paths)?;
//! fintrack::server::run(settings, paths).await?;
//! ```

pub mod auth;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod http;
pub mod metrics;
pub mod models;
pub mod reports;
pub mod server;
pub mod services;
pub mod storage;

pub use error::{FinTrackError, FinTrackResult};
