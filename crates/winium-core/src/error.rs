use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use winium_remote::RemoteError;

/// Errors produced while configuring, launching or talking to a Winium driver.
#[derive(Debug, Error)]
pub enum WiniumError {
    /// The requested setup is invalid (unknown variant, missing application
    /// path, unusable remote address). Nothing was started.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The OS would not hand out an ephemeral port.
    #[error("failed to allocate a free port: {0}")]
    PortAllocation(#[source] std::io::Error),

    /// The driver executable does not exist at the expected location.
    #[error("driver executable not found at {path}; download it from {download_url}")]
    ExecutableNotFound {
        path: PathBuf,
        download_url: &'static str,
    },

    /// The driver executable exists but could not be launched.
    #[error("failed to spawn driver {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The driver did not answer its readiness probe in time.
    #[error("driver on port {port} did not become ready within {timeout:?}")]
    StartupTimeout { port: u16, timeout: Duration },

    /// The driver process exited while it was expected to be running.
    #[error("driver process exited during startup ({status})")]
    ProcessExited { status: String },

    /// `start` was called on a service that is already running.
    #[error("driver service on port {0} is already running")]
    AlreadyRunning(u16),

    /// `start` was called on a service that has been stopped.
    #[error("driver service on port {0} has been stopped and cannot be restarted")]
    ServiceStopped(u16),

    /// Failure reported by the remote protocol layer.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl WiniumError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
