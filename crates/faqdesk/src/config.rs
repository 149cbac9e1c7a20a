//! Configuration management for faqdesk.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::labels::Locale;
use crate::store::DEFAULT_SNAPSHOT_BUFFER;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "faqdesk";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "faqs.db";

/// Prefix for configuration environment variables.
const ENV_PREFIX: &str = "FAQDESK_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (`FAQDESK_<SECTION>__<KEY>`)
/// 2. TOML config file at `~/.config/faqdesk/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document store configuration.
    pub store: StoreConfig,
    /// Display configuration.
    pub display: DisplayConfig,
}

/// Document store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/faqdesk/faqs.db`
    pub database_path: Option<PathBuf>,
    /// Snapshots buffered per watcher before it starts skipping.
    pub snapshot_buffer: usize,
    /// How often `watch` checks for commits made by other processes.
    pub poll_interval_ms: u64,
}

/// Display configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Locale for category names and fixed labels.
    pub locale: Locale,
    /// Characters of question text shown per row in admin tables.
    pub admin_question_width: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            snapshot_buffer: DEFAULT_SNAPSHOT_BUFFER,
            poll_interval_ms: 500,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            admin_question_width: 40,
        }
    }
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let config: Config = Self::figment(Toml::file(&config_file)).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(file: figment::providers::Data<Toml>) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(file)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.store.snapshot_buffer == 0 {
            return Err(Error::ConfigValidation {
                message: "store.snapshot_buffer must be greater than 0".to_string(),
            });
        }

        if self.store.poll_interval_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "store.poll_interval_ms must be greater than 0".to_string(),
            });
        }

        if self.display.admin_question_width == 0 {
            return Err(Error::ConfigValidation {
                message: "display.admin_question_width must be greater than 0".to_string(),
            });
        }

        if let Some(path) = &self.store.database_path {
            if path.as_os_str().is_empty() {
                return Err(Error::ConfigValidation {
                    message: "store.database_path must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.store
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the external change poll interval as a Duration.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.store.poll_interval_ms)
    }
}
