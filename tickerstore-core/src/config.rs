//! TOML configuration.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration that stores into `stocks.db` and looks back ten
//! years for tickers without history.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file.
    pub database: PathBuf,
    pub refresh: RefreshSettings,
    pub news: NewsSettings,
    pub provider: ProviderSettings,
}

/// Price refresh settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshSettings {
    /// Years of history fetched for a ticker with no stored bars.
    pub lookback_years: u32,
}

/// News refresh settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsSettings {
    /// Maximum news items requested per ticker.
    pub count: usize,
    /// Symbols starting with this marker are indexes and get no news.
    pub index_marker: String,
}

/// HTTP provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from("stocks.db"),
            refresh: RefreshSettings::default(),
            news: NewsSettings::default(),
            provider: ProviderSettings::default(),
        }
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self { lookback_years: 10 }
    }
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            count: 10,
            index_marker: "^".into(),
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
        }
    }
}

impl ProviderSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string and validate it.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh.lookback_years == 0 {
            return Err(ConfigError::Invalid(
                "refresh.lookback_years must be at least 1".into(),
            ));
        }
        if self.news.count == 0 {
            return Err(ConfigError::Invalid("news.count must be at least 1".into()));
        }
        if self.news.index_marker.is_empty() {
            return Err(ConfigError::Invalid(
                "news.index_marker must not be empty".into(),
            ));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "provider.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
