//! Relay configuration.
//!
//! Loaded once from a JSON file before the server starts and passed down
//! explicitly; nothing reads it from global state. The file keeps the
//! `douyin`/`other` keys of existing deployments and adds optional tuning
//! keys on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Default substring that routes a URL to the platform backend.
pub const DEFAULT_PLATFORM_MARKER: &str = "douyin";
/// Default quality requested from the generic backend.
pub const DEFAULT_QUALITY: &str = "1080p";
/// Default container format requested from the generic backend.
pub const DEFAULT_FORMAT: &str = "mp4";
/// Default timeout for every outbound request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Default number of `/history` polls before giving up.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 60;
/// Default wait between `/history` polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    /// The config file is not valid JSON or has the wrong shape.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value parsed but is unusable.
    #[error("Invalid config value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// How the generic backend's history is polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PollPolicy {
    /// Maximum number of `/history` calls.
    pub max_attempts: u32,
    /// Wait between two consecutive calls.
    #[serde(rename = "interval_secs", deserialize_with = "duration_from_secs")]
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_POLL_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PollPolicy {
    pub const fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }
}

/// Settings the dispatcher needs at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    pub platform_marker: String,
    pub quality: String,
    pub format: String,
    pub poll: PollPolicy,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            platform_marker: DEFAULT_PLATFORM_MARKER.to_string(),
            quality: DEFAULT_QUALITY.to_string(),
            format: DEFAULT_FORMAT.to_string(),
            poll: PollPolicy::default(),
        }
    }
}

/// Top-level relay configuration, as stored in `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelayConfig {
    /// Endpoint of the platform-specific backend (`GET {endpoint}?url=`).
    #[serde(rename = "douyin")]
    pub platform_endpoint: String,
    /// Base URL of the generic job backend (`/add`, `/history`, `/download`).
    #[serde(rename = "other")]
    pub generic_endpoint: String,
    #[serde(default = "default_platform_marker")]
    pub platform_marker: String,
    #[serde(default = "default_quality")]
    pub quality: String,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(
        default = "default_request_timeout",
        rename = "request_timeout_secs",
        deserialize_with = "duration_from_secs"
    )]
    pub request_timeout: Duration,
    #[serde(default)]
    pub poll: PollPolicy,
}

impl RelayConfig {
    /// Create a config with default tuning for the two endpoints.
    pub fn new(platform_endpoint: impl Into<String>, generic_endpoint: impl Into<String>) -> Self {
        Self {
            platform_endpoint: platform_endpoint.into(),
            generic_endpoint: generic_endpoint.into(),
            platform_marker: default_platform_marker(),
            quality: default_quality(),
            format: default_format(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            poll: PollPolicy::default(),
        }
    }

    /// Load and validate a config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&contents)
    }

    /// Parse and validate config JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint("douyin", &self.platform_endpoint)?;
        validate_endpoint("other", &self.generic_endpoint)?;

        if self.platform_marker.is_empty() {
            return Err(ConfigError::Invalid {
                key: "platform_marker",
                reason: "must not be empty".to_string(),
            });
        }
        if self.poll.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "poll.max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                key: "request_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_platform_marker(mut self, marker: impl Into<String>) -> Self {
        self.platform_marker = marker.into();
        self
    }

    /// The subset of settings the dispatcher consumes.
    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            platform_marker: self.platform_marker.clone(),
            quality: self.quality.clone(),
            format: self.format.clone(),
            poll: self.poll,
        }
    }
}

fn validate_endpoint(key: &'static str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value).map_err(|e| ConfigError::Invalid {
        key,
        reason: format!("'{value}' is not a valid URL: {e}"),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            key,
            reason: format!("'{value}' must use http or https"),
        });
    }
    Ok(())
}

fn duration_from_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}

fn default_platform_marker() -> String {
    DEFAULT_PLATFORM_MARKER.to_string()
}

fn default_quality() -> String {
    DEFAULT_QUALITY.to_string()
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

const fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}
