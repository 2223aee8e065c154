//! The session façade.
//!
//! [`WiniumDriver`] ties the pieces together: it validates options, launches
//! (or connects to) a driver, extends the executor's registry with the Winium
//! commands, negotiates a session, and tears everything down on
//! [`WiniumDriver::quit`].

pub mod elements;

use std::path::PathBuf;

use serde_json::{Map, Value};
use tracing::{info, warn};
use winium_remote::registry::names as base;
use winium_remote::{Command, CommandExecutor, RemoteError};

use crate::commands::register_winium_commands;
use crate::config::DriverConfig;
use crate::error::WiniumError;
use crate::executor::{Endpoint, resolve_executor};
use crate::options::WiniumOptions;
use crate::service::DriverService;

pub use elements::{ElementId, Locator, MENU_PATH_SEPARATOR};

/// Name of the session-creation payload field.
pub const DESIRED_CAPABILITIES: &str = "desiredCapabilities";

/// An open Winium session.
pub struct WiniumDriver {
    executor: Box<dyn CommandExecutor>,
    /// Present when this driver launched the service and must stop it.
    service: Option<DriverService>,
    session_id: String,
    capabilities: Value,
}

impl std::fmt::Debug for WiniumDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WiniumDriver")
            .field("session_id", &self.session_id)
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

impl WiniumDriver {
    /// Launch the driver executable for `options`' variant from
    /// `executable_dir` and open a session on it.
    pub async fn start(
        executable_dir: impl Into<PathBuf>,
        options: impl Into<WiniumOptions>,
        config: &DriverConfig,
    ) -> Result<Self, WiniumError> {
        let options = options.into();
        options.validate()?;
        let service = DriverService::for_variant(options.variant(), executable_dir)?
            .with_config(config.service.clone());
        Self::with_service(service, options, config).await
    }

    /// Open a session on a service configured by the caller. The service is
    /// started here and owned by the returned driver.
    pub async fn with_service(
        service: DriverService,
        options: impl Into<WiniumOptions>,
        config: &DriverConfig,
    ) -> Result<Self, WiniumError> {
        let options = options.into();
        options.validate()?;

        service.start().await?;
        let executor = match resolve_executor(Endpoint::Service(&service), config.command_timeout())
        {
            Ok(executor) => executor,
            Err(e) => {
                stop_quietly(&service).await;
                return Err(e);
            }
        };
        Self::open(executor, Some(service), &options).await
    }

    /// Open a session on a driver that is already running at `remote_url`.
    pub async fn connect(
        remote_url: &str,
        options: impl Into<WiniumOptions>,
        config: &DriverConfig,
    ) -> Result<Self, WiniumError> {
        let options = options.into();
        options.validate()?;
        let executor = resolve_executor(Endpoint::Remote(remote_url), config.command_timeout())?;
        Self::open(executor, None, &options).await
    }

    /// Open a session through a caller-supplied executor.
    pub async fn with_executor(
        executor: Box<dyn CommandExecutor>,
        options: impl Into<WiniumOptions>,
    ) -> Result<Self, WiniumError> {
        let options = options.into();
        options.validate()?;
        Self::open(executor, None, &options).await
    }

    async fn open(
        mut executor: Box<dyn CommandExecutor>,
        service: Option<DriverService>,
        options: &WiniumOptions,
    ) -> Result<Self, WiniumError> {
        match negotiate(executor.as_mut(), options).await {
            Ok((session_id, capabilities)) => {
                info!(
                    session_id = %session_id,
                    variant = %options.variant(),
                    "session opened"
                );
                Ok(Self {
                    executor,
                    service,
                    session_id,
                    capabilities,
                })
            }
            Err(e) => {
                if let Some(service) = &service {
                    stop_quietly(service).await;
                }
                Err(e)
            }
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Capabilities as reported by the driver.
    pub fn capabilities(&self) -> &Value {
        &self.capabilities
    }

    /// The launched service, if this driver owns one.
    pub fn service(&self) -> Option<&DriverService> {
        self.service.as_ref()
    }

    /// Run any registered command in this session and return its value.
    pub async fn execute(
        &self,
        name: &str,
        parameters: Map<String, Value>,
    ) -> Result<Value, WiniumError> {
        let command = Command {
            session_id: Some(self.session_id.clone()),
            name: name.to_string(),
            parameters,
        };
        let response = self.executor.execute(&command).await?;
        Ok(response.value)
    }

    /// Find the first element matching `locator` in the whole window tree.
    pub async fn find_element(&self, locator: &Locator) -> Result<ElementId, WiniumError> {
        let value = self
            .execute(base::FIND_ELEMENT, locator.to_parameters())
            .await?;
        ElementId::from_value(&value)
    }

    /// Find the first descendant of `parent` matching `locator`.
    pub async fn find_child_element(
        &self,
        parent: &ElementId,
        locator: &Locator,
    ) -> Result<ElementId, WiniumError> {
        let mut parameters = locator.to_parameters();
        parameters.insert("id".to_string(), Value::String(parent.as_str().to_string()));
        let value = self.execute(base::FIND_CHILD_ELEMENT, parameters).await?;
        ElementId::from_value(&value)
    }

    /// End the session and stop the owned service, if any.
    ///
    /// The service is stopped even when the `quit` command fails; the
    /// command's error is still returned.
    pub async fn quit(self) -> Result<(), WiniumError> {
        let result = self.execute(base::QUIT, Map::new()).await;
        if let Some(service) = &self.service {
            stop_quietly(service).await;
        }
        info!(session_id = %self.session_id, "session closed");
        result.map(|_| ())
    }
}

/// Extend the registry, then send `newSession`.
async fn negotiate(
    executor: &mut dyn CommandExecutor,
    options: &WiniumOptions,
) -> Result<(String, Value), WiniumError> {
    register_winium_commands(executor.registry_mut())?;

    let command = Command::new(None, base::NEW_SESSION)
        .with_parameter(DESIRED_CAPABILITIES, options.to_capabilities().to_json());
    let response = executor.execute(&command).await?;

    let session_id = response.session_id.ok_or_else(|| {
        RemoteError::MalformedResponse("newSession response carried no session id".to_string())
    })?;
    // W3C drivers nest the capabilities next to the session id.
    let capabilities = match response.value {
        Value::Object(mut value) if value.contains_key("sessionId") => {
            value.remove("capabilities").unwrap_or(Value::Null)
        }
        other => other,
    };
    Ok((session_id, capabilities))
}

async fn stop_quietly(service: &DriverService) {
    if let Err(e) = service.stop().await {
        warn!(port = service.port(), error = %e, "failed to stop driver service");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;
    use winium_remote::{CommandRegistry, Response};

    use super::*;
    use crate::commands::names;
    use crate::options::DesktopOptions;

    /// Executor that answers from a script and records every command.
    struct ScriptedExecutor {
        registry: CommandRegistry,
        sent: Mutex<Vec<Command>>,
        session_response: Value,
        reply: Value,
    }

    impl ScriptedExecutor {
        fn new(session_response: Value, reply: Value) -> Self {
            Self {
                registry: CommandRegistry::with_base_commands(),
                sent: Mutex::new(Vec::new()),
                session_response,
                reply,
            }
        }
    }

    #[async_trait]
    impl CommandExecutor for ScriptedExecutor {
        fn registry(&self) -> &CommandRegistry {
            &self.registry
        }

        fn registry_mut(&mut self) -> &mut CommandRegistry {
            &mut self.registry
        }

        async fn execute(&self, command: &Command) -> Result<Response, RemoteError> {
            if !self.registry.contains(&command.name) {
                return Err(RemoteError::UnknownCommand(command.name.clone()));
            }
            self.sent.lock().unwrap().push(command.clone());
            let body = if command.name == base::NEW_SESSION {
                self.session_response.clone()
            } else {
                json!({ "sessionId": command.session_id, "status": 0, "value": self.reply })
            };
            Response::from_json(body)
        }
    }

    fn desktop() -> DesktopOptions {
        DesktopOptions::new(r"C:\Windows\System32\notepad.exe")
    }

    #[tokio::test]
    async fn opens_session_with_desired_capabilities() {
        let executor = ScriptedExecutor::new(
            json!({ "sessionId": "s-1", "status": 0, "value": { "app": "x" } }),
            Value::Null,
        );
        let driver = WiniumDriver::with_executor(Box::new(executor), desktop())
            .await
            .unwrap();
        assert_eq!(driver.session_id(), "s-1");
        assert_eq!(driver.capabilities(), &json!({ "app": "x" }));
        assert!(driver.service().is_none());
    }

    #[tokio::test]
    async fn w3c_session_capabilities_are_unnested() {
        let executor = ScriptedExecutor::new(
            json!({ "value": { "sessionId": "w3c", "capabilities": { "app": "y" } } }),
            Value::Null,
        );
        let driver = WiniumDriver::with_executor(Box::new(executor), desktop())
            .await
            .unwrap();
        assert_eq!(driver.session_id(), "w3c");
        assert_eq!(driver.capabilities(), &json!({ "app": "y" }));
    }

    #[tokio::test]
    async fn missing_session_id_is_malformed() {
        let executor = ScriptedExecutor::new(json!({ "status": 0, "value": {} }), Value::Null);
        let err = WiniumDriver::with_executor(Box::new(executor), desktop())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WiniumError::Remote(RemoteError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn registry_collision_fails_before_session() {
        let mut executor = ScriptedExecutor::new(json!({ "sessionId": "s" }), Value::Null);
        executor
            .registry
            .try_add(
                names::EXPAND_COMBO_BOX,
                winium_remote::CommandInfo::new(winium_remote::HttpVerb::Post, "/x"),
            )
            .unwrap();
        let err = WiniumDriver::with_executor(Box::new(executor), desktop())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WiniumError::Remote(RemoteError::DuplicateCommand(ref n)) if n == names::EXPAND_COMBO_BOX
        ));
    }

    #[tokio::test]
    async fn invalid_options_rejected_before_any_command() {
        let executor = ScriptedExecutor::new(json!({ "sessionId": "s" }), Value::Null);
        let err = WiniumDriver::with_executor(Box::new(executor), DesktopOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WiniumError::Configuration(_)));
    }

    #[tokio::test]
    async fn typed_helpers_decode_values() {
        let executor = ScriptedExecutor::new(json!({ "sessionId": "s" }), json!(7));
        let driver = WiniumDriver::with_executor(Box::new(executor), desktop())
            .await
            .unwrap();
        let grid = ElementId::new("grid");
        assert_eq!(driver.data_grid_row_count(&grid).await.unwrap(), 7);
        assert!(driver.is_combo_box_expanded(&grid).await.is_err());
    }

    #[tokio::test]
    async fn unregistered_command_is_rejected() {
        let executor = ScriptedExecutor::new(json!({ "sessionId": "s" }), Value::Null);
        let driver = WiniumDriver::with_executor(Box::new(executor), desktop())
            .await
            .unwrap();
        let err = driver.execute("teleport", Map::new()).await.unwrap_err();
        assert!(matches!(
            err,
            WiniumError::Remote(RemoteError::UnknownCommand(ref n)) if n == "teleport"
        ));
    }
}
