//! # Configuration Management
//!
//! Centralized configuration for the mesh access layer.
//!
//! This module provides structured configuration for the exchange policy and
//! logging. The values here describe *policy*: how long the external timer
//! collaborator should wait before declaring an exchange incomplete, and
//! which TTL outgoing requests carry. The timer itself lives outside this
//! crate.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-specific overrides via `from_env()`

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};

/// Default incomplete-timer span in milliseconds.
pub const DEFAULT_INCOMPLETE_TIMER_MS: u64 = 10_000;

/// Default time-to-live for outgoing requests.
pub const DEFAULT_TTL: u8 = 5;

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProtocolConfig {
    /// Exchange policy
    #[serde(default)]
    pub exchange: ExchangeConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Policy for a single exchange.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExchangeConfig {
    /// How long the timer collaborator waits for further segments or the
    /// status reply before calling `on_incomplete_timer_expired`.
    #[serde(default = "default_incomplete_timer_ms")]
    pub incomplete_timer_ms: u64,

    /// Time-to-live carried by outgoing requests.
    #[serde(default = "default_ttl")]
    pub default_ttl: u8,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            incomplete_timer_ms: DEFAULT_INCOMPLETE_TIMER_MS,
            default_ttl: DEFAULT_TTL,
        }
    }
}

impl ExchangeConfig {
    pub fn incomplete_timer(&self) -> Duration {
        Duration::from_millis(self.incomplete_timer_ms)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Filter directives handed to the subscriber, e.g. `mesh_protocol=debug`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_incomplete_timer_ms() -> u64 {
    DEFAULT_INCOMPLETE_TIMER_MS
}

fn default_ttl() -> u8 {
    DEFAULT_TTL
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl ProtocolConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config = toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(timer) = std::env::var("MESH_PROTOCOL_INCOMPLETE_TIMER_MS") {
            if let Ok(val) = timer.parse::<u64>() {
                config.exchange.incomplete_timer_ms = val;
            }
        }

        if let Ok(ttl) = std::env::var("MESH_PROTOCOL_DEFAULT_TTL") {
            if let Ok(val) = ttl.parse::<u8>() {
                config.exchange.default_ttl = val;
            }
        }

        if let Ok(filter) = std::env::var("MESH_PROTOCOL_LOG_FILTER") {
            config.logging.filter = filter;
        }

        config.validate()?;
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

    /// Check value ranges.
    ///
    /// # Errors
    /// The incomplete timer must be non-zero and the TTL at most 127.
    pub fn validate(&self) -> Result<()> {
        if self.exchange.incomplete_timer_ms == 0 {
            return Err(ProtocolError::ConfigError(
                "incomplete timer must be non-zero".to_string(),
            ));
        }
        if self.exchange.default_ttl > 0x7F {
            return Err(ProtocolError::ConfigError(format!(
                "TTL {} exceeds the 7-bit range",
                self.exchange.default_ttl
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ProtocolConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.exchange.incomplete_timer(),
            Duration::from_millis(DEFAULT_INCOMPLETE_TIMER_MS)
        );
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = ProtocolConfig::from_toml(
            r#"
            [exchange]
            incomplete_timer_ms = 30000

            [logging]
            filter = "mesh_protocol=debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.exchange.incomplete_timer_ms, 30_000);
        assert_eq!(config.exchange.default_ttl, DEFAULT_TTL);
        assert_eq!(config.logging.filter, "mesh_protocol=debug");
    }

    #[test]
    fn zero_timer_rejected() {
        let result = ProtocolConfig::from_toml("[exchange]\nincomplete_timer_ms = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn oversized_ttl_rejected() {
        let config = ProtocolConfig::default_with_overrides(|c| c.exchange.default_ttl = 0xFF);
        assert!(config.validate().is_err());
    }
}
