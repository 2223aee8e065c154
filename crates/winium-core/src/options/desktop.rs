use serde::Deserialize;
use winium_remote::Capabilities;

use super::{KeyboardSimulator, keys};

/// Options for Winium.Desktop (classic Win32 / WinForms / WPF applications).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DesktopOptions {
    /// Absolute path of the application to launch.
    pub application_path: String,
    /// Command-line arguments for the application. Sent only when non-empty.
    pub arguments: String,
    /// Attach to an already running instance instead of launching one.
    pub debug_connect_to_running_app: Option<bool>,
    pub keyboard_simulator: Option<KeyboardSimulator>,
    /// Milliseconds to wait after launching before the session is ready.
    pub launch_delay: Option<u32>,
}

impl DesktopOptions {
    pub fn new(application_path: impl Into<String>) -> Self {
        Self {
            application_path: application_path.into(),
            ..Self::default()
        }
    }

    /// `app` is always present; every other entry only when it was set.
    pub fn to_capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::new();
        caps.set(keys::APP, self.application_path.as_str());

        if !self.arguments.is_empty() {
            caps.set(keys::ARGS, self.arguments.as_str());
        }
        if let Some(attach) = self.debug_connect_to_running_app {
            caps.set(keys::DEBUG_CONNECT_TO_RUNNING_APP, attach);
        }
        if let Some(simulator) = self.keyboard_simulator {
            caps.set(keys::KEYBOARD_SIMULATOR, simulator.code());
        }
        if let Some(delay) = self.launch_delay {
            caps.set(keys::LAUNCH_DELAY, delay);
        }

        caps
    }
}
