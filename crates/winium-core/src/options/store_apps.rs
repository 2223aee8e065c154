use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use winium_remote::Capabilities;

use super::keys;

/// Options for Winium.StoreApps (Windows Store / Windows Phone 8.1 apps).
///
/// `files` and `dependencies` default to empty and are only sent when they
/// hold at least one entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreAppsOptions {
    /// Path of the `.appx` package to install and launch.
    pub application_path: String,
    pub debug_connect_to_running_app: Option<bool>,
    /// Dependency packages to install before the app.
    pub dependencies: Vec<String>,
    /// Emulator name to target.
    pub device_name: String,
    /// Local file path → path inside the app's storage.
    pub files: BTreeMap<String, String>,
    pub launch_delay: Option<u32>,
    pub launch_timeout: Option<u32>,
}

impl StoreAppsOptions {
    pub fn new(application_path: impl Into<String>) -> Self {
        Self {
            application_path: application_path.into(),
            ..Self::default()
        }
    }

    pub fn to_capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::new();
        caps.set(keys::APP, self.application_path.as_str());

        if !self.files.is_empty() {
            let files: Map<String, Value> = self
                .files
                .iter()
                .map(|(local, remote)| (local.clone(), Value::String(remote.clone())))
                .collect();
            caps.set(keys::FILES, files);
        }
        if let Some(attach) = self.debug_connect_to_running_app {
            caps.set(keys::DEBUG_CONNECT_TO_RUNNING_APP, attach);
        }
        if !self.device_name.is_empty() {
            caps.set(keys::DEVICE_NAME, self.device_name.as_str());
        }
        if let Some(timeout) = self.launch_timeout {
            caps.set(keys::LAUNCH_TIMEOUT, timeout);
        }
        if let Some(delay) = self.launch_delay {
            caps.set(keys::LAUNCH_DELAY, delay);
        }
        if !self.dependencies.is_empty() {
            caps.set(keys::DEPENDENCIES, self.dependencies.clone());
        }

        caps
    }
}
