//! Guard configuration.
//!
//! Controls how long a guard waits for the identity collaborator and how
//! denials are logged. Loaded from environment variables with defaults
//! suitable for local development.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Access guard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// How long a pending session lookup may take before it settles as
    /// unauthenticated, in milliseconds.
    pub session_timeout_ms: u64,

    /// Delay between polls while the session reports an unknown status,
    /// in milliseconds.
    pub poll_interval_ms: u64,

    /// Emit a debug event for every denial.
    pub log_denials: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            session_timeout_ms: 10_000,
            poll_interval_ms: 50,
            log_denials: true,
        }
    }
}

impl GuardConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `OPSDESK_SESSION_TIMEOUT_MS`: Session lookup timeout (default: 10000)
    /// - `OPSDESK_SESSION_POLL_MS`: Poll interval while status is unknown (default: 50)
    /// - `OPSDESK_LOG_DENIALS`: Log every denial at debug level (default: true)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            session_timeout_ms: std::env::var("OPSDESK_SESSION_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.session_timeout_ms),
            poll_interval_ms: std::env::var("OPSDESK_SESSION_POLL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.poll_interval_ms),
            log_denials: std::env::var("OPSDESK_LOG_DENIALS")
                .map(|s| s != "false" && s != "0")
                .unwrap_or(default.log_denials),
        }
    }

    /// Session lookup timeout as a Duration.
    pub fn session_timeout(&self) -> Duration {
        Duration::from_millis(self.session_timeout_ms)
    }

    /// Poll interval as a Duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Reject values that would make every lookup fail or spin.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "OPSDESK_SESSION_TIMEOUT_MS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "OPSDESK_SESSION_POLL_MS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GuardConfig::default();
        assert_eq!(config.session_timeout(), Duration::from_secs(10));
        assert_eq!(config.poll_interval(), Duration::from_millis(50));
        assert!(config.log_denials);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = GuardConfig {
            session_timeout_ms: 0,
            ..GuardConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "OPSDESK_SESSION_TIMEOUT_MS"
        ));
    }

    #[test]
    fn test_validate_rejects_zero_poll_interval() {
        let config = GuardConfig {
            poll_interval_ms: 0,
            ..GuardConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_deserializes() {
        let config: GuardConfig = serde_json::from_str(
            r#"{"session_timeout_ms": 250, "poll_interval_ms": 5, "log_denials": false}"#,
        )
        .unwrap();
        assert_eq!(config.session_timeout(), Duration::from_millis(250));
        assert!(!config.log_denials);
    }
}
