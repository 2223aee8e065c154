//! Timeouts and addressing for driver services and sessions.
//!
//! Both structs deserialize from TOML with every field optional:
//!
//! ```toml
//! command_timeout_secs = 120
//!
//! [service]
//! host = "127.0.0.1"
//! start_timeout_ms = 30000
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::error::WiniumError;

/// How a driver service is launched, probed and stopped.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Host the readiness probe and command executor connect to.
    pub host: String,
    /// How long `start` waits for the driver to answer `GET /status`.
    pub start_timeout_ms: u64,
    /// How long `stop` waits after SIGTERM before force-killing.
    pub stop_timeout_ms: u64,
    /// Delay between readiness probes.
    pub poll_interval_ms: u64,
}

impl ServiceConfig {
    pub const DEFAULT_HOST: &str = "127.0.0.1";

    pub fn start_timeout(&self) -> Duration {
        Duration::from_millis(self.start_timeout_ms)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: Self::DEFAULT_HOST.to_string(),
            start_timeout_ms: 20_000,
            stop_timeout_ms: 5_000,
            poll_interval_ms: 100,
        }
    }
}

/// Session-level settings for [`crate::WiniumDriver`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    /// Upper bound for a single remote command round-trip.
    pub command_timeout_secs: u64,
    /// Settings for services the driver launches itself.
    pub service: ServiceConfig,
}

impl DriverConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Parse a TOML document; absent fields keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, WiniumError> {
        Ok(toml::from_str(contents)?)
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: winium_remote::RemoteConfig::DEFAULT_COMMAND_TIMEOUT.as_secs(),
            service: ServiceConfig::default(),
        }
    }
}
