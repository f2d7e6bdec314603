//! Configuration module for FinTrack
//!
//! This module provides configuration management including:
//! - XDG-compliant data directory resolution
//! - Server settings from `config.json` and environment variables

pub mod paths;
pub mod settings;

pub use paths::FinTrackPaths;
pub use settings::Settings;
