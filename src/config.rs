//! Configuration loading for Notiflink.
//!
//! Settings live in a TOML file whose path is taken from
//! `NOTIFLINK_CONFIG_PATH`, falling back to `config/notiflink.toml`. Every
//! section and every key is optional; a missing file yields the defaults.

use crate::connection::domain::{DEFAULT_API_KEY_BYTES, MAX_API_KEY_BYTES};
use crate::connection::services::DEFAULT_CASCADE_ATTEMPTS;
use crate::pagination::DEFAULT_LIMIT;
use crate::store::{DEFAULT_STORE_TIMEOUT, StoreBudget};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "NOTIFLINK_CONFIG_PATH";

/// Configuration file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/notiflink.toml";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("failed to read configuration file {}: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML for [`Config`].
    #[error("failed to parse configuration: {0}")]
    Parse(#[source] Box<toml::de::Error>),

    /// A value is outside its permitted range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Store access settings.
    pub store: StoreConfig,
    /// Connection lifecycle settings.
    pub connection: ConnectionConfig,
    /// Listing settings.
    pub pagination: PaginationConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Store access settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Time allowed for one store interaction, in milliseconds.
    pub timeout_ms: u64,
    /// `PostgreSQL` connection URL. Required only for the `PostgreSQL`
    /// adapters.
    pub database_url: Option<String>,
    /// Maximum size of the `PostgreSQL` connection pool.
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            timeout_ms: u64::try_from(DEFAULT_STORE_TIMEOUT.as_millis()).unwrap_or(u64::MAX),
            database_url: None,
            max_connections: 4,
        }
    }
}

/// Connection lifecycle settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Random bytes behind each issued API key.
    pub api_key_bytes: usize,
    /// Attempts per connection during cascade deactivation.
    pub cascade_max_attempts: u32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            api_key_bytes: DEFAULT_API_KEY_BYTES,
            cascade_max_attempts: DEFAULT_CASCADE_ATTEMPTS,
        }
    }
}

/// Listing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationConfig {
    /// Page size used when a request does not supply a usable one.
    pub default_limit: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing` filter directives used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
        }
    }
}

impl Config {
    /// Loads configuration from the path in [`CONFIG_PATH_ENV`], or from
    /// [`DEFAULT_CONFIG_PATH`].
    ///
    /// # Errors
    ///
    /// See [`Config::load_from`].
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
        Self::load_from(path)
    }

    /// Loads configuration from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file exists but cannot be read,
    /// [`ConfigError::Parse`] when it is not valid, and
    /// [`ConfigError::Invalid`] when a value is out of range.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = path.as_ref();
        match std::fs::read_to_string(file) {
            Ok(content) => Self::from_toml_str(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %file.display(), "no configuration file, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::Io {
                path: file.to_path_buf(),
                source: err,
            }),
        }
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(Box::new(err)))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would disable an operation outright, and key
    /// sizes too large for the key columns.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero_checks = [
            ("store.timeout_ms", self.store.timeout_ms == 0),
            ("store.max_connections", self.store.max_connections == 0),
            ("connection.api_key_bytes", self.connection.api_key_bytes == 0),
            (
                "connection.cascade_max_attempts",
                self.connection.cascade_max_attempts == 0,
            ),
            ("pagination.default_limit", self.pagination.default_limit == 0),
        ];
        if let Some((key, _)) = zero_checks.iter().find(|(_, is_zero)| *is_zero) {
            return Err(ConfigError::Invalid(format!("{key} must be greater than zero")));
        }
        if self.connection.api_key_bytes > MAX_API_KEY_BYTES {
            return Err(ConfigError::Invalid(format!(
                "connection.api_key_bytes must not exceed {MAX_API_KEY_BYTES}"
            )));
        }
        if self
            .store
            .database_url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "store.database_url must not be blank".to_owned(),
            ));
        }
        Ok(())
    }

    /// Returns the per-interaction store budget.
    #[must_use]
    pub const fn store_budget(&self) -> StoreBudget {
        StoreBudget::new(Duration::from_millis(self.store.timeout_ms))
    }
}
