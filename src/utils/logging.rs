//! Structured logging setup.
//!
//! Installs a global `tracing-subscriber` subscriber driven by
//! [`LoggingConfig`]. `RUST_LOG`, when set, overrides the configured level.
//! Installing twice is reported as an error rather than a panic, so tests
//! and embedding applications can call it freely.

use crate::config::LoggingConfig;
use crate::error::{constants, Result, SessionError};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Install the global subscriber described by `config`
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    let console = config.log_to_console.then(|| {
        if config.json_format {
            fmt::layer().json().with_target(true).boxed()
        } else {
            fmt::layer().with_target(true).boxed()
        }
    });

    let file = match (&config.log_file_path, config.log_to_file) {
        (Some(path), true) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let writer = Mutex::new(file);
            Some(if config.json_format {
                fmt::layer().json().with_ansi(false).with_writer(writer).boxed()
            } else {
                fmt::layer().with_ansi(false).with_writer(writer).boxed()
            })
        }
        _ => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| SessionError::ConfigError(format!("{}: {e}", constants::ERR_LOGGING_INIT)))?;

    info!(
        app = %config.app_name,
        level = %config.log_level,
        json = config.json_format,
        "Logging initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error_not_a_panic() {
        let config = LoggingConfig {
            log_to_console: false,
            ..LoggingConfig::default()
        };
        let first = init_logging(&config);
        let second = init_logging(&config);
        // another test in this binary may have installed a subscriber first
        assert!(first.is_err() || second.is_err());
        if let Err(e) = second {
            assert!(matches!(e, SessionError::ConfigError(_)));
        }
    }
}
