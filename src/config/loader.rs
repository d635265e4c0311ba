//! Configuration Loader
//!
//! Loads and validates configuration from TOML files. Every key has a
//! default, so a partial file (or no file at all) is a valid configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::adapters::coingecko::{CoinGeckoConfig, DEFAULT_API_URL, MAX_PER_PAGE};
use crate::application::{RefreshConfig, RetryPolicy};
use crate::domain::views::{ViewParams, DEFAULT_RECENT_DAYS, DEFAULT_TOP_N, DEFAULT_VOLUME_THRESHOLD};

/// Default location of the favorites file
pub const DEFAULT_FAVORITES_PATH: &str = "~/.coinwatch/favorites.json";

/// Longest accepted lookback for the recent-highs view (100 years)
pub const MAX_RECENT_DAYS: i64 = 36_500;

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiSection,
    pub retry: RetrySection,
    pub refresh: RefreshSection,
    pub favorites: FavoritesSection,
    pub views: ViewsSection,
    pub logging: LoggingSection,
}

/// Market data API section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    /// API base URL (without `/coins/markets`)
    pub base_url: String,
    /// Quote currency for prices and volumes
    pub vs_currency: String,
    /// Listings per fetch (max 250)
    pub per_page: u32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Optional demo API key
    pub api_key: Option<String>,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            vs_currency: "usd".to_string(),
            per_page: 100,
            timeout_secs: 10,
            api_key: None,
        }
    }
}

impl ApiSection {
    /// Get base URL with environment variable override
    /// Checks COINWATCH_API_URL env var first, falls back to config value.
    /// A blank override is ignored.
    pub fn get_base_url(&self) -> String {
        non_blank_or(std::env::var("COINWATCH_API_URL").ok(), &self.base_url)
    }

    /// Get API key with environment variable fallback
    /// Checks COINWATCH_API_KEY env var if config value is empty/None
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var("COINWATCH_API_KEY").ok().filter(|k| !k.is_empty())
    }
}

/// Timeout retry section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySection {
    /// Extra attempts after a timeout
    pub max_retries: u32,
    /// First backoff delay in milliseconds (doubles per retry)
    pub base_backoff_ms: u64,
    /// Backoff ceiling in milliseconds
    pub max_backoff_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff_ms: 1_000,
            max_backoff_ms: 8_000,
        }
    }
}

/// Refresh timing section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshSection {
    /// Automatic refresh period in seconds
    pub interval_secs: u64,
    /// Manual refresh cooldown after a successful fetch, in seconds
    pub manual_cooldown_secs: u64,
}

impl Default for RefreshSection {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            manual_cooldown_secs: 30,
        }
    }
}

/// Favorites persistence section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FavoritesSection {
    /// Favorites file; `~` is expanded
    pub path: String,
}

impl Default for FavoritesSection {
    fn default() -> Self {
        Self {
            path: DEFAULT_FAVORITES_PATH.to_string(),
        }
    }
}

impl FavoritesSection {
    /// Favorites path with COINWATCH_FAVORITES override and `~` expansion
    pub fn get_path(&self) -> PathBuf {
        let raw = non_blank_or(std::env::var("COINWATCH_FAVORITES").ok(), &self.path);
        expand_path(&raw)
    }
}

/// View tunables section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewsSection {
    /// Minimum 24h volume for the volume view
    pub volume_threshold: f64,
    /// Lookback in days for the recent-highs view
    pub recent_days: i64,
    /// Rows in the gainers/losers views
    pub top_n: usize,
    /// View shown when the dashboard starts
    pub default_view: String,
}

impl Default for ViewsSection {
    fn default() -> Self {
        Self {
            volume_threshold: DEFAULT_VOLUME_THRESHOLD,
            recent_days: DEFAULT_RECENT_DAYS,
            top_n: DEFAULT_TOP_N,
            default_view: "all".to_string(),
        }
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load the file if it exists, otherwise use defaults
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!("No config at {}, using defaults", path.display());
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }
}

fn non_blank_or(value: Option<String>, fallback: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Expand `~` and environment variables in a path
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api.base_url cannot be empty".to_string(),
            ));
        }

        if self.api.vs_currency.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api.vs_currency cannot be empty".to_string(),
            ));
        }

        if self.api.per_page == 0 || self.api.per_page > MAX_PER_PAGE {
            return Err(ConfigError::ValidationError(format!(
                "api.per_page must be 1-{}, got {}",
                MAX_PER_PAGE, self.api.per_page
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "api.timeout_secs must be > 0".to_string(),
            ));
        }

        if self.retry.base_backoff_ms > self.retry.max_backoff_ms {
            return Err(ConfigError::ValidationError(format!(
                "retry.base_backoff_ms ({}) must not exceed retry.max_backoff_ms ({})",
                self.retry.base_backoff_ms, self.retry.max_backoff_ms
            )));
        }

        if self.refresh.interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "refresh.interval_secs must be > 0".to_string(),
            ));
        }

        if self.favorites.path.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "favorites.path cannot be empty".to_string(),
            ));
        }

        if !(self.views.volume_threshold >= 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "views.volume_threshold must be >= 0, got {}",
                self.views.volume_threshold
            )));
        }

        if !(0..=MAX_RECENT_DAYS).contains(&self.views.recent_days) {
            return Err(ConfigError::ValidationError(format!(
                "views.recent_days must be 0-{}, got {}",
                MAX_RECENT_DAYS, self.views.recent_days
            )));
        }

        if self.views.top_n == 0 {
            return Err(ConfigError::ValidationError(
                "views.top_n must be > 0".to_string(),
            ));
        }

        if let Err(e) = self.views.default_view.parse::<crate::domain::View>() {
            return Err(ConfigError::ValidationError(e.to_string()));
        }

        Ok(())
    }
}

impl From<&Config> for CoinGeckoConfig {
    fn from(config: &Config) -> Self {
        CoinGeckoConfig {
            api_base_url: config.api.get_base_url(),
            api_key: config.api.get_api_key(),
            vs_currency: config.api.vs_currency.clone(),
            per_page: config.api.per_page,
            timeout: Duration::from_secs(config.api.timeout_secs),
        }
    }
}

impl From<&Config> for RetryPolicy {
    fn from(config: &Config) -> Self {
        RetryPolicy {
            max_retries: config.retry.max_retries,
            base_backoff: Duration::from_millis(config.retry.base_backoff_ms),
            max_backoff: Duration::from_millis(config.retry.max_backoff_ms),
        }
    }
}

impl From<&Config> for RefreshConfig {
    fn from(config: &Config) -> Self {
        RefreshConfig {
            interval: Duration::from_secs(config.refresh.interval_secs),
            manual_cooldown: Duration::from_secs(config.refresh.manual_cooldown_secs),
        }
    }
}

impl From<&Config> for ViewParams {
    fn from(config: &Config) -> Self {
        ViewParams {
            volume_threshold: config.views.volume_threshold,
            recent_days: config.views.recent_days,
            top_n: config.views.top_n,
            ..ViewParams::default()
        }
    }
}
