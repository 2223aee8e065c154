//! The command executor seam and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use crate::command::{Command, HttpVerb};
use crate::config::RemoteConfig;
use crate::error::RemoteError;
use crate::registry::CommandRegistry;
use crate::response::Response;

/// Transport that sends named commands to a driver endpoint.
///
/// Each executor owns the [`CommandRegistry`] that defines which command
/// names it understands. The registry is extended once, before the first
/// session is opened, and only read afterwards.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    fn registry(&self) -> &CommandRegistry;

    fn registry_mut(&mut self) -> &mut CommandRegistry;

    /// Send one command and decode its response.
    ///
    /// Transport failures and protocol errors are returned as-is; nothing is
    /// retried because commands are not guaranteed to be idempotent.
    async fn execute(&self, command: &Command) -> Result<Response, RemoteError>;
}

// Compile-time assertion: CommandExecutor must be usable as `dyn CommandExecutor`.
const _: () = {
    fn _assert_object_safe(_: &dyn CommandExecutor) {}
};

/// [`CommandExecutor`] that speaks HTTP to a fixed base URL.
#[derive(Debug, Clone)]
pub struct HttpCommandExecutor {
    base_url: Url,
    client: Client,
    registry: CommandRegistry,
}

impl HttpCommandExecutor {
    /// Build an executor from a [`RemoteConfig`].
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        Self::from_url(config.parse_url()?, config.command_timeout)
    }

    /// Build an executor for `base_url`, applying `command_timeout` to every
    /// request.
    pub fn from_url(base_url: Url, command_timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(command_timeout).build()?;
        Ok(Self {
            base_url,
            client,
            registry: CommandRegistry::with_base_commands(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl CommandExecutor for HttpCommandExecutor {
    fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    async fn execute(&self, command: &Command) -> Result<Response, RemoteError> {
        let info = self
            .registry
            .get(&command.name)
            .ok_or_else(|| RemoteError::UnknownCommand(command.name.clone()))?;
        let url = info.build_url(&self.base_url, command)?;

        debug!(
            command = %command.name,
            verb = %info.verb(),
            url = %url,
            "sending command"
        );

        let mut request = self.client.request(info.verb().into(), url);
        if info.verb() == HttpVerb::Post {
            request = request.json(&Value::Object(command.parameters.clone()));
        }

        let http_response = request.send().await?;
        let http_status = http_response.status().as_u16();
        let body = http_response.text().await?;

        debug!(command = %command.name, http_status, "received response");
        Response::from_body(http_status, &body)
    }
}
