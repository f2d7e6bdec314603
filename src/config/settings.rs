//! Server settings for FinTrack
//!
//! Settings are layered: serde defaults, then an optional `config.json` in the
//! base directory, then environment variables. Command-line flags are applied
//! last by the binary.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::paths::FinTrackPaths;
use crate::error::FinTrackError;

/// Secret used when `SECRET_KEY` is not configured
pub const DEFAULT_SECRET_KEY: &str = "CHANGE_ME_IN_PROD";

/// Settings for the FinTrack server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,

    /// HMAC key for access tokens
    #[serde(default = "default_secret_key")]
    pub secret_key: String,

    /// Lifetime of an access token
    #[serde(default = "default_token_minutes")]
    pub access_token_expire_minutes: i64,

    /// Emit logs as JSON lines instead of human-readable text
    #[serde(default)]
    pub log_json: bool,

    /// Development mode: reload data files changed outside the process
    #[serde(default)]
    pub reload: bool,

    /// How often the reload watcher polls the data files
    #[serde(default = "default_reload_interval_ms")]
    pub reload_interval_ms: u64,
}

fn default_schema_version() -> u32 {
    1
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_secret_key() -> String {
    DEFAULT_SECRET_KEY.to_string()
}

fn default_token_minutes() -> i64 {
    30
}

fn default_reload_interval_ms() -> u64 {
    1000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            host: default_host(),
            port: default_port(),
            secret_key: default_secret_key(),
            access_token_expire_minutes: default_token_minutes(),
            log_json: false,
            reload: false,
            reload_interval_ms: default_reload_interval_ms(),
        }
    }
}

impl Settings {
    /// Load settings from `config.json` (if present) and the process environment
    pub fn load(paths: &FinTrackPaths) -> Result<Self, FinTrackError> {
        let mut settings = Self::load_file(paths)?;
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Load settings from disk, or defaults if the file doesn't exist
    pub fn load_file(paths: &FinTrackPaths) -> Result<Self, FinTrackError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| FinTrackError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| FinTrackError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Apply environment overrides through a lookup function
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), FinTrackError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST").filter(|v| !v.trim().is_empty()) {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| FinTrackError::Config(format!("PORT is not a valid port: {port}")))?;
        }
        if let Some(secret) = lookup("SECRET_KEY").filter(|v| !v.is_empty()) {
            self.secret_key = secret;
        }
        if let Some(minutes) = lookup("ACCESS_TOKEN_EXPIRE_MINUTES") {
            self.access_token_expire_minutes = minutes.trim().parse().map_err(|_| {
                FinTrackError::Config(format!(
                    "ACCESS_TOKEN_EXPIRE_MINUTES is not a number: {minutes}"
                ))
            })?;
        }
        if let Some(flag) = lookup("FINTRACK_LOG_JSON").and_then(|v| parse_bool(&v)) {
            self.log_json = flag;
        }
        if let Some(flag) = lookup("FINTRACK_RELOAD").and_then(|v| parse_bool(&v)) {
            self.reload = flag;
        }
        if let Some(ms) = lookup("FINTRACK_RELOAD_INTERVAL_MS").and_then(|v| v.trim().parse().ok())
        {
            self.reload_interval_ms = ms;
        }
        self.validate()
    }

    /// Check invariants that the server relies on
    pub fn validate(&self) -> Result<(), FinTrackError> {
        if self.access_token_expire_minutes <= 0 {
            return Err(FinTrackError::Config(
                "access_token_expire_minutes must be positive".into(),
            ));
        }
        if self.secret_key.is_empty() {
            return Err(FinTrackError::Config("secret_key cannot be empty".into()));
        }
        if self.reload_interval_ms == 0 {
            return Err(FinTrackError::Config(
                "reload_interval_ms must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Whether the token key is still the placeholder
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }

    /// Parse the bind address
    pub fn bind_addr(&self) -> Result<SocketAddr, FinTrackError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| FinTrackError::Config(format!("invalid bind address: {}", e)))
    }

    pub fn token_lifetime(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.access_token_expire_minutes)
    }

    pub fn reload_interval(&self) -> Duration {
        Duration::from_millis(self.reload_interval_ms)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &FinTrackPaths) -> Result<(), FinTrackError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| FinTrackError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| FinTrackError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}
