//! Client configuration for the polling loop.
//!
//! Loaded from a TOML document with an `[output]` section, matching the
//! client configuration file of the wider platform:
//!
//! ```toml
//! [output]
//! poll_frequency_in_seconds = 0.5
//! fetch_retry_attempts = 3
//! ```
//!
//! # Defaults
//!
//! | Setting                     | Default | Description                              |
//! |-----------------------------|---------|------------------------------------------|
//! | `poll_frequency_in_seconds` | 1.0     | Sleep between status fetches             |
//! | `fetch_retry_attempts`      | 3       | Extra fetch attempts on transient errors |

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::constants::{DEFAULT_FETCH_RETRY_ATTEMPTS, DEFAULT_POLL_FREQUENCY_IN_SECONDS};

/// Errors raised while loading or validating client configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("malformed client configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configured poll frequency is not a positive finite number.
    #[error("poll_frequency_in_seconds must be a positive number, got {value}")]
    InvalidPollFrequency {
        /// The rejected value.
        value: f64,
    },
}

/// Output-related settings: polling cadence and fetch retry budget.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutputConfig {
    /// Seconds slept between status fetches. Must be finite and strictly
    /// positive.
    #[serde(default = "default_poll_frequency")]
    pub poll_frequency_in_seconds: f64,

    /// Additional fetch attempts made when a status fetch fails with a
    /// transient service error.
    #[serde(default = "default_fetch_retry_attempts")]
    pub fetch_retry_attempts: u32,
}

fn default_poll_frequency() -> f64 {
    DEFAULT_POLL_FREQUENCY_IN_SECONDS
}

fn default_fetch_retry_attempts() -> u32 {
    DEFAULT_FETCH_RETRY_ATTEMPTS
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            poll_frequency_in_seconds: DEFAULT_POLL_FREQUENCY_IN_SECONDS,
            fetch_retry_attempts: DEFAULT_FETCH_RETRY_ATTEMPTS,
        }
    }
}

/// Client configuration.
///
/// # Examples
///
/// ```
/// use pulp_tasks::ClientConfig;
///
/// let config = ClientConfig::from_toml_str(
///     "[output]\npoll_frequency_in_seconds = 0.25\n",
/// ).unwrap();
/// assert_eq!(config.output.poll_frequency_in_seconds, 0.25);
/// assert_eq!(config.output.fetch_retry_attempts, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ClientConfig {
    /// Output and polling settings.
    #[serde(default)]
    pub output: OutputConfig,
}

impl ClientConfig {
    /// Parses and validates a TOML configuration document.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Parse`] on malformed TOML.
    /// - [`ConfigError::InvalidPollFrequency`] when the poll frequency is
    ///   zero, negative, or not finite.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configured values.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidPollFrequency`] when the poll frequency is
    ///   zero, negative, or not finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let frequency = self.output.poll_frequency_in_seconds;
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(ConfigError::InvalidPollFrequency { value: frequency });
        }
        Ok(())
    }

    /// The poll interval as a [`Duration`].
    ///
    /// Callers must [`validate`](Self::validate) first; construction via
    /// [`from_toml_str`](Self::from_toml_str) or `Default` always yields
    /// a valid frequency.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.output.poll_frequency_in_seconds)
    }
}
