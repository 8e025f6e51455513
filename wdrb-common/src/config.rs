//! Configuration loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. TOML config file
//! 4. Compiled defaults (fallback)
//!
//! Command-line and environment values arrive together as [`ConfigOverrides`]
//! (clap reads both); the TOML file supplies everything else. A missing config
//! file is not fatal; a malformed one is.

use crate::time::millis_to_duration;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "WDRB_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Upload-URL (authorization) service endpoint
    #[serde(default)]
    pub authorization_url: Option<String>,

    /// Catalog query service endpoint
    #[serde(default)]
    pub catalog_url: Option<String>,

    /// Bearer token forwarded to the backend services
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Signed-in user id (absent means not signed in)
    #[serde(default)]
    pub user_id: Option<String>,

    /// Per-request timeout for backend calls
    ///
    /// Default: 30 seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Catalog refresh timing
    #[serde(default)]
    pub refresh: RefreshConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            authorization_url: None,
            catalog_url: None,
            auth_token: None,
            user_id: None,
            request_timeout_secs: default_request_timeout_secs(),
            refresh: RefreshConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Catalog refresh timing, as written in TOML
///
/// `delay_ms` is the fixed wait before a single re-query. The remaining fields
/// bound the backoff poll that waits for the backend to index new uploads.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_refresh_delay_ms")]
    pub delay_ms: u64,

    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_refresh_delay_ms(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl RefreshConfig {
    /// Convert to a validated [`RefreshPolicy`]
    pub fn policy(&self) -> Result<RefreshPolicy> {
        let policy = RefreshPolicy {
            fixed_delay: millis_to_duration(self.delay_ms),
            initial_delay: millis_to_duration(self.initial_delay_ms),
            max_delay: millis_to_duration(self.max_delay_ms),
            multiplier: self.multiplier,
            max_attempts: self.max_attempts,
        };
        policy.validate()?;
        Ok(policy)
    }
}

/// Refresh timing used at runtime
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshPolicy {
    /// Wait before a one-shot refresh
    pub fixed_delay: Duration,
    /// Wait before the first poll
    pub initial_delay: Duration,
    /// Upper bound for any single wait
    pub max_delay: Duration,
    /// Growth factor between consecutive waits
    pub multiplier: f64,
    /// Total number of catalog queries the poll may issue
    pub max_attempts: u32,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            fixed_delay: millis_to_duration(default_refresh_delay_ms()),
            initial_delay: millis_to_duration(default_initial_delay_ms()),
            max_delay: millis_to_duration(default_max_delay_ms()),
            multiplier: default_multiplier(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl RefreshPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::Config("refresh.max_attempts must be at least 1".to_string()));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(Error::Config(format!(
                "refresh.multiplier must be >= 1.0 (got {})",
                self.multiplier
            )));
        }
        if self.max_delay < self.initial_delay {
            return Err(Error::Config(
                "refresh.max_delay_ms must not be smaller than refresh.initial_delay_ms".to_string(),
            ));
        }
        Ok(())
    }

    /// Wait before poll number `attempt` (0-based), capped at `max_delay`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt.min(i32::MAX as u32) as i32);
        let millis = self.initial_delay.as_millis() as f64 * factor;
        let capped = millis.min(self.max_delay.as_millis() as f64);
        millis_to_duration(capped as u64)
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_refresh_delay_ms() -> u64 {
    3000
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    8000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_max_attempts() -> u32 {
    6
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub authorization_url: Option<String>,
    pub catalog_url: Option<String>,
    pub auth_token: Option<String>,
    pub user_id: Option<String>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Load the config file if one can be found, otherwise use defaults
    ///
    /// An explicitly named file (CLI or environment) that does not exist is
    /// an error; a missing default file only logs a warning.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_config_path(cli_path) {
            if !path.exists() {
                return Err(Error::Config(format!("Config file not found: {}", path.display())));
            }
            debug!(path = %path.display(), "Loading explicit config file");
            return Self::from_file(&path);
        }

        match default_config_path() {
            Some(path) => {
                debug!(path = %path.display(), "Loading config file");
                Self::from_file(&path)
            }
            None => {
                warn!("No config file found, using compiled defaults");
                Ok(Self::default())
            }
        }
    }

    /// Apply command-line/environment values on top of the file values
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if overrides.authorization_url.is_some() {
            self.authorization_url = overrides.authorization_url;
        }
        if overrides.catalog_url.is_some() {
            self.catalog_url = overrides.catalog_url;
        }
        if overrides.auth_token.is_some() {
            self.auth_token = overrides.auth_token;
        }
        if overrides.user_id.is_some() {
            self.user_id = overrides.user_id;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        self
    }

    /// Resolve the two backend endpoints, failing if either is missing
    pub fn endpoints(&self) -> Result<ServiceEndpoints> {
        let authorization_url = non_empty(self.authorization_url.as_deref())
            .ok_or_else(|| Error::Config("authorization_url is not configured".to_string()))?;
        let catalog_url = non_empty(self.catalog_url.as_deref())
            .ok_or_else(|| Error::Config("catalog_url is not configured".to_string()))?;

        Ok(ServiceEndpoints {
            authorization_url: authorization_url.to_string(),
            catalog_url: catalog_url.to_string(),
            auth_token: non_empty(self.auth_token.as_deref()).map(str::to_string),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        })
    }
}

/// Resolved backend connection settings
#[derive(Debug, Clone)]
pub struct ServiceEndpoints {
    pub authorization_url: String,
    pub catalog_url: String,
    pub auth_token: Option<String>,
    pub request_timeout: Duration,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn explicit_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    std::env::var(CONFIG_ENV_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

/// Get the default configuration file path for the platform, if it exists
fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("wardrobe").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        // System-wide fallback
        let system_config = PathBuf::from("/etc/wardrobe/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
