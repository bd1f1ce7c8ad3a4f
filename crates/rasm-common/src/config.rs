//! Configuration structures for the timing utilities.
//!
//! Supports TOML deserialization with defaults matching the historical
//! behavior (five nested timers, no slow-region warnings).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Default nesting bound for a layered stopwatch.
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Largest supported nesting bound; stopwatch storage is sized to it.
pub const MAX_DEPTH: usize = 32;

/// Top-level timing configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Layered stopwatch configuration.
    pub stopwatch: StopwatchConfig,

    /// Uptime tracker configuration.
    pub uptime: UptimeConfig,
}

/// Layered stopwatch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopwatchConfig {
    /// Maximum number of simultaneously open regions.
    pub max_depth: usize,

    /// Closed regions longer than this are logged at WARN level.
    #[serde(with = "humantime_serde::option", skip_serializing_if = "Option::is_none")]
    pub slow_region_threshold: Option<Duration>,
}

impl Default for StopwatchConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            slow_region_threshold: None,
        }
    }
}

/// Uptime tracker configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UptimeConfig {
    /// How elapsed milliseconds are turned into the "seconds" reading.
    pub seconds_conversion: SecondsConversion,
}

/// Conversion applied by `current_time_seconds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SecondsConversion {
    /// Whole seconds: `millis / 1000`.
    #[default]
    Truncate,
    /// Historical arithmetic: `millis * 1000`, saturating.
    ///
    /// Only for callers that were built against the old, mis-scaled reading.
    LegacyScaled,
}

impl SecondsConversion {
    /// Convert an elapsed millisecond reading.
    #[must_use]
    pub fn apply(self, millis: u64) -> u64 {
        match self {
            Self::Truncate => millis / 1000,
            Self::LegacyScaled => millis.saturating_mul(1000),
        }
    }
}

impl TimingConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading timing configuration");
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or the values fail validation.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `stopwatch.max_depth` is outside
    /// `1..=MAX_DEPTH`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let depth = self.stopwatch.max_depth;
        if !(1..=MAX_DEPTH).contains(&depth) {
            return Err(ConfigError::Invalid(format!(
                "stopwatch.max_depth must be between 1 and {MAX_DEPTH}, got {depth}"
            )));
        }
        Ok(())
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is outside its allowed range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Serde helpers for `Duration` using humantime format.
mod humantime_serde {
    pub mod option {
        use serde::{self, Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        #[allow(clippy::ref_option)] // signature fixed by serde's `with`
        pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match duration {
                Some(d) => serializer.serialize_str(&humantime::format_duration(*d).to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|s| humantime::parse_duration(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
