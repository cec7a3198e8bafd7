//! Configuration module for fileshare.

use serde::Deserialize;
use std::path::Path;

use crate::{FileshareError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Timezone for displaying dates (e.g., "Europe/Berlin", "UTC").
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timezone: default_timezone(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/fileshare.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory all uploaded files are written to.
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// Maximum request body size for uploads in megabytes (0 = unlimited).
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_storage_root() -> String {
    "data/uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    1024
}

impl StorageConfig {
    /// Upload body limit in bytes, or `None` when unlimited.
    pub fn max_upload_bytes(&self) -> Option<usize> {
        if self.max_upload_size_mb == 0 {
            return None;
        }
        usize::try_from(self.max_upload_size_mb.saturating_mul(1024 * 1024)).ok()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/fileshare.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// File storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            FileshareError::Config(format!("cannot read {}: {e}", path.as_ref().display()))
        })?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FileshareError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FILESHARE_STORAGE_ROOT`: Override the storage root directory
    /// - `FILESHARE_DATABASE_PATH`: Override the SQLite database path
    /// - `FILESHARE_PORT`: Override the listen port
    pub fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var("FILESHARE_STORAGE_ROOT") {
            if !root.is_empty() {
                self.storage.root = root;
            }
        }

        if let Ok(path) = std::env::var("FILESHARE_DATABASE_PATH") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }

        if let Ok(port) = std::env::var("FILESHARE_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid FILESHARE_PORT value: {}", port),
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The storage root is empty
    /// - The timezone is not a known IANA timezone name
    pub fn validate(&self) -> Result<()> {
        if self.storage.root.trim().is_empty() {
            return Err(FileshareError::Config(
                "storage.root must not be empty".to_string(),
            ));
        }

        if self.server.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(FileshareError::Config(format!(
                "unknown timezone: {}",
                self.server.timezone
            )));
        }

        Ok(())
    }
}
