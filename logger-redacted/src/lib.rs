//! Tracing setup with PII redaction for Gatehouse
//!
//! Personal data and bearer tokens must never reach the log verbatim. Call
//! sites pass identifying values through [`redact`] before recording them as
//! fields; the default configuration replaces each match with a short stable
//! hash so events about the same principal can still be correlated.
//!
//! ```rust
//! use logger_redacted::redact;
//!
//! let field = redact("alice@example.com");
//! assert!(field.starts_with("EMAIL["));
//! assert_eq!(field, redact("ALICE@example.com"));
//! ```

pub mod config;
pub mod redactor;

pub use config::*;
pub use redactor::*;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("Invalid log filter '{0}': {1}")]
    InvalidFilter(String, String),
    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over [`LoggerConfig::log_level`] when set.
/// [`LoggerConfig::redaction_enabled`] switches [`redact`] for the whole
/// process.
pub fn init_tracing(config: &LoggerConfig) -> Result<(), LoggerError> {
    set_redaction_enabled(config.redaction_enabled);

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .map_err(|e| LoggerError::InvalidFilter(config.log_level.clone(), e.to_string()))?,
    };

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_timer(fmt::time::ChronoUtc::rfc_3339()),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(fmt::time::ChronoUtc::rfc_3339()),
            )
            .try_init()
    };

    result.map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))?;

    tracing::debug!(
        redaction_enabled = config.redaction_enabled,
        json = config.json,
        "Tracing initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_is_reported() {
        std::env::remove_var("RUST_LOG");
        let config = LoggerConfig::default().with_level("gatehouse=loud");
        assert!(matches!(
            init_tracing(&config),
            Err(LoggerError::InvalidFilter(_, _))
        ));
    }

    #[test]
    fn test_default_config() {
        let config = LoggerConfig::default();
        assert!(config.redaction_enabled);
        assert_eq!(config.log_level, "info");
        assert!(!config.json);
    }
}
