//! Picks the command transport for a session.
//!
//! A session either talks to a driver service this process launched, or to
//! a driver someone else runs at a known URL. Both resolve to an
//! [`HttpCommandExecutor`] behind the [`CommandExecutor`] trait object so the
//! façade never cares which one it got.

use std::time::Duration;

use tracing::debug;
use winium_remote::{CommandExecutor, HttpCommandExecutor, RemoteConfig, RemoteError};

use crate::error::WiniumError;
use crate::service::DriverService;

/// Where commands for a session are sent.
#[derive(Debug, Clone, Copy)]
pub enum Endpoint<'a> {
    /// A locally launched service; its URL is derived from host and port.
    Service(&'a DriverService),
    /// An already running driver at this base URL.
    Remote(&'a str),
}

impl Endpoint<'_> {
    pub fn url(&self) -> String {
        match self {
            Self::Service(service) => service.service_url(),
            Self::Remote(url) => (*url).to_string(),
        }
    }
}

/// Build the executor for `endpoint` with the base command set registered.
///
/// An unusable remote address is a [`WiniumError::Configuration`]; it is the
/// caller's input that is wrong, not the transport.
pub fn resolve_executor(
    endpoint: Endpoint<'_>,
    command_timeout: Duration,
) -> Result<Box<dyn CommandExecutor>, WiniumError> {
    let config = RemoteConfig::new(endpoint.url()).with_command_timeout(command_timeout);
    let executor = HttpCommandExecutor::new(&config).map_err(|e| match e {
        RemoteError::InvalidUrl { address, reason } => {
            WiniumError::configuration(format!("invalid driver address {address:?}: {reason}"))
        }
        other => WiniumError::Remote(other),
    })?;
    debug!(url = %executor.base_url(), ?command_timeout, "resolved command executor");
    Ok(Box::new(executor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_endpoint_uses_service_url() {
        let service = DriverService::desktop("/opt/winium").unwrap().with_port(9999);
        let endpoint = Endpoint::Service(&service);
        assert_eq!(endpoint.url(), "http://127.0.0.1:9999/");
        let executor = resolve_executor(endpoint, Duration::from_secs(5)).unwrap();
        assert!(executor.registry().contains("newSession"));
    }

    #[test]
    fn remote_endpoint_accepts_http_url() {
        let executor =
            resolve_executor(Endpoint::Remote("http://10.0.0.5:9999/"), Duration::from_secs(5))
                .unwrap();
        assert!(executor.registry().contains("quit"));
    }

    #[test]
    fn malformed_remote_url_is_configuration_error() {
        let err = resolve_executor(Endpoint::Remote("not a url"), Duration::from_secs(5))
            .err()
            .unwrap();
        assert!(matches!(err, WiniumError::Configuration(ref m) if m.contains("not a url")));
    }

    #[test]
    fn non_http_scheme_is_configuration_error() {
        let err = resolve_executor(Endpoint::Remote("ftp://host/"), Duration::from_secs(5))
            .err()
            .unwrap();
        assert!(matches!(err, WiniumError::Configuration(_)));
    }
}
