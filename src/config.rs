//! # Configuration Management
//!
//! Centralized configuration for the session cache and its logging.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()` / `from_toml()`
//! - Direct instantiation with defaults
//! - Environment overrides via `from_env()` (`TLS_SESSION_CACHE_*`)
//!
//! ## Example
//! ```toml
//! [cache]
//! capacity = 20480
//! default_timeout = 304
//! mode = "server"
//!
//! [logging]
//! log_level = "debug"
//! ```

use crate::context::Role;
use crate::core::session::{DEFAULT_SESSION_TIMEOUT, MAX_SESSION_ID_LENGTH};
use crate::error::{constants, Result, SessionError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// Default cache size bound, matching common TLS stacks
pub const DEFAULT_CACHE_CAPACITY: usize = 20 * 1024;

/// Default sweep batch size
pub const DEFAULT_SWEEP_BATCH_SIZE: usize = crate::cache::store::DEFAULT_SWEEP_BATCH_SIZE;

/// Default length of generated session ids
pub const DEFAULT_SESSION_ID_LENGTH: usize = MAX_SESSION_ID_LENGTH;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SessionCacheConfig {
    /// Session cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SessionCacheConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| SessionError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| SessionError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| SessionError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables on top of the defaults.
    ///
    /// Unparseable numbers are ignored; an unknown mode is an error.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(capacity) = std::env::var("TLS_SESSION_CACHE_CAPACITY") {
            if let Ok(val) = capacity.parse::<usize>() {
                config.cache.capacity = val;
            }
        }

        if let Ok(timeout) = std::env::var("TLS_SESSION_CACHE_DEFAULT_TIMEOUT_SECS") {
            if let Ok(val) = timeout.parse::<u64>() {
                config.cache.default_timeout = Duration::from_secs(val);
            }
        }

        if let Ok(mode) = std::env::var("TLS_SESSION_CACHE_MODE") {
            config.cache.mode = mode.parse()?;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SessionError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| SessionError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.cache.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SessionError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Which side's sessions are cached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// No session is cached
    Off,
    /// Sessions established as a client are cached
    Client,
    /// Sessions established as a server are cached
    #[default]
    Server,
    /// Both
    Both,
}

impl CacheMode {
    /// Whether sessions established in `role` are cached
    pub fn covers(self, role: Role) -> bool {
        matches!(
            (self, role),
            (CacheMode::Both, _) | (CacheMode::Client, Role::Client) | (CacheMode::Server, Role::Server)
        )
    }
}

impl FromStr for CacheMode {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(CacheMode::Off),
            "client" => Ok(CacheMode::Client),
            "server" => Ok(CacheMode::Server),
            "both" => Ok(CacheMode::Both),
            other => Err(SessionError::ConfigError(format!(
                "{}: '{other}'",
                constants::ERR_UNKNOWN_CACHE_MODE
            ))),
        }
    }
}

/// Session cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached sessions; 0 means unbounded
    pub capacity: usize,

    /// Lifetime given to new sessions
    #[serde(with = "duration_secs_serde")]
    pub default_timeout: Duration,

    /// Which side's sessions are cached
    pub mode: CacheMode,

    /// Disable the flush that runs every 255 completed handshakes
    pub no_auto_clear: bool,

    /// Skip the internal store when matching; only the get hook is asked
    pub no_internal_lookup: bool,

    /// Do not insert established sessions into the internal store
    pub no_internal_store: bool,

    /// Entries handled per write-lock acquisition during sweeps
    pub sweep_batch_size: usize,

    /// Length of generated session ids
    pub session_id_length: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            default_timeout: DEFAULT_SESSION_TIMEOUT,
            mode: CacheMode::default(),
            no_auto_clear: false,
            no_internal_lookup: false,
            no_internal_store: false,
            sweep_batch_size: DEFAULT_SWEEP_BATCH_SIZE,
            session_id_length: DEFAULT_SESSION_ID_LENGTH,
        }
    }
}

impl CacheConfig {
    /// Validate cache configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.default_timeout.as_secs() == 0 {
            errors.push("Default session timeout must be at least 1s".to_string());
        } else if self.default_timeout.as_secs() > 7 * 24 * 3600 {
            errors.push(format!(
                "Default session timeout too long: {}s (maximum: 7 days)",
                self.default_timeout.as_secs()
            ));
        }

        if self.capacity > 10_000_000 {
            errors.push(format!(
                "Cache capacity very high: {} (ensure system memory can support this)",
                self.capacity
            ));
        }

        if self.sweep_batch_size == 0 {
            errors.push("Sweep batch size must be greater than 0".to_string());
        }

        if self.session_id_length == 0 || self.session_id_length > MAX_SESSION_ID_LENGTH {
            errors.push(format!(
                "Invalid session id length: {} (valid range: 1-{MAX_SESSION_ID_LENGTH})",
                self.session_id_length
            ));
        }

        if self.no_internal_lookup && self.no_internal_store && self.mode != CacheMode::Off {
            errors.push(
                "Internal lookup and internal store are both disabled; only external hooks will see sessions"
                    .to_string(),
            );
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to log to console
    pub log_to_console: bool,

    /// Whether to log to file
    pub log_to_file: bool,

    /// Path to log file (if log_to_file is true)
    pub log_file_path: Option<String>,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("tls-session-cache"),
            log_level: Level::INFO,
            log_to_console: true,
            log_to_file: false,
            log_file_path: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        if self.log_to_file {
            if let Some(ref path) = self.log_file_path {
                if let Some(parent) = Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        errors.push(format!(
                            "Log file directory does not exist: {}",
                            parent.display()
                        ));
                    }
                }
            } else {
                errors.push("log_file_path must be specified when log_to_file is true".to_string());
            }
        }

        if !self.log_to_console && !self.log_to_file {
            errors
                .push("At least one logging output (console or file) must be enabled".to_string());
        }

        errors
    }
}

/// Duration as whole seconds, the unit session lifetimes are kept in
mod duration_secs_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
