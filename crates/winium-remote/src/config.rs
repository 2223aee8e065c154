use std::time::Duration;

use reqwest::Url;

use crate::error::RemoteError;

/// Where to send commands and how long to wait for each one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Base URL of the driver endpoint (e.g. `http://127.0.0.1:9999/`).
    pub url: String,
    /// Upper bound for a single command round-trip.
    pub command_timeout: Duration,
}

impl RemoteConfig {
    /// Per-command timeout used when the caller does not pick one.
    pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            command_timeout: Self::DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Parse [`RemoteConfig::url`] into an absolute HTTP(S) URL.
    pub fn parse_url(&self) -> Result<Url, RemoteError> {
        let url = Url::parse(&self.url).map_err(|e| RemoteError::InvalidUrl {
            address: self.url.clone(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(RemoteError::InvalidUrl {
                address: self.url.clone(),
                reason: format!("unsupported scheme {other:?}"),
            }),
        }
    }
}
