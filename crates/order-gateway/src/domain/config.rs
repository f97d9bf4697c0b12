//! Gateway configuration with validation.
//!
//! Sources, lowest precedence first: `Default`, a TOML document
//! ([`GatewayConfig::from_toml_str`] / [`GatewayConfig::from_file`]), then
//! environment overrides ([`GatewayConfig::with_env_overrides`]).
//!
//! ```toml
//! failure_shape = "field_errors"
//!
//! [engine]
//! default_timeout = "30s"
//! settled_retention = "2m"
//! channel_capacity = 1000
//! ```

use crate::domain::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Env var: default per-request deadline (humantime, e.g. `30s`).
pub const ENV_DEFAULT_TIMEOUT: &str = "OG_DEFAULT_TIMEOUT";
/// Env var: how long settled ids are remembered for diagnostics.
pub const ENV_SETTLED_RETENTION: &str = "OG_SETTLED_RETENTION";
/// Env var: per-subscriber channel buffer.
pub const ENV_CHANNEL_CAPACITY: &str = "OG_CHANNEL_CAPACITY";
/// Env var: `reason` or `field_errors`.
pub const ENV_FAILURE_SHAPE: &str = "OG_FAILURE_SHAPE";

/// Main gateway configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Canonical shape of the backend's failure payload
    pub failure_shape: FailureShape,
    /// Correlation engine settings
    pub engine: EngineConfig,
}

impl GatewayConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values found by `lookup` (normally `std::env::var`).
    pub fn with_env_overrides<L>(mut self, lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_DEFAULT_TIMEOUT) {
            self.engine.default_timeout = parse_duration(ENV_DEFAULT_TIMEOUT, &value)?;
        }
        if let Some(value) = lookup(ENV_SETTLED_RETENTION) {
            self.engine.settled_retention = parse_duration(ENV_SETTLED_RETENTION, &value)?;
        }
        if let Some(value) = lookup(ENV_CHANNEL_CAPACITY) {
            self.engine.channel_capacity =
                value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    var: ENV_CHANNEL_CAPACITY,
                    value: value.clone(),
                })?;
        }
        if let Some(value) = lookup(ENV_FAILURE_SHAPE) {
            self.failure_shape = value.parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_FAILURE_SHAPE,
                value: value.clone(),
            })?;
        }
        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()
    }
}

fn parse_duration(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    humantime_serde::parse_duration(value).map_err(|_| ConfigError::InvalidEnv {
        var,
        value: value.to_string(),
    })
}

/// Correlation engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deadline applied to every request that does not set its own.
    #[serde(with = "humantime_serde")]
    pub default_timeout: Duration,
    /// How long a settled id is remembered so late and duplicate
    /// completions can be told apart from unknown ones.
    #[serde(with = "humantime_serde")]
    pub settled_retention: Duration,
    /// Per-subscriber buffer for in-memory channels.
    pub channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            settled_retention: Duration::from_secs(120),
            channel_capacity: shared_bus::DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Validate engine settings. A deployment without a deadline can hang
    /// callers forever, so a zero timeout is rejected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "default_timeout cannot be 0".into(),
            ));
        }
        if self.settled_retention.is_zero() {
            return Err(ConfigError::InvalidRetention(
                "settled_retention cannot be 0".into(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::InvalidCapacity(
                "channel_capacity cannot be 0".into(),
            ));
        }
        Ok(())
    }
}

/// Canonical failure payload shape emitted by the backend.
///
/// The backend must pick one and keep it; the gateway never guesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureShape {
    /// `{error, reason}` (business-rule rejection)
    #[default]
    Reason,
    /// `[{field, errorDescription}, ...]` (per-field validation)
    FieldErrors,
}

impl FromStr for FailureShape {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reason" => Ok(Self::Reason),
            "field_errors" | "fielderrors" => Ok(Self::FieldErrors),
            other => Err(ConfigError::Parse(format!("unknown failure shape: {}", other))),
        }
    }
}

/// Human-readable durations: `250ms`, `30s`, `2m`, `1h`, or plain seconds.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_nanos() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        // `ms` must be checked before `m` and `s`
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .map_err(|_| "invalid minutes")?
                .checked_mul(60)
                .map(Duration::from_secs)
                .ok_or("duration overflow")
        } else if let Some(hours) = s.strip_suffix('h') {
            hours
                .trim()
                .parse::<u64>()
                .map_err(|_| "invalid hours")?
                .checked_mul(3600)
                .map(Duration::from_secs)
                .ok_or("duration overflow")
        } else {
            // Try parsing as plain seconds
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}
