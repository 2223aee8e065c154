use serde::Deserialize;
use winium_remote::Capabilities;

use super::keys;

/// Options for the Windows Phone Silverlight driver.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SilverlightOptions {
    /// Path of the `.xap` package.
    pub application_path: String,
    pub debug_connect_to_running_app: Option<bool>,
    pub device_name: String,
    /// Port of the automation server injected into the app.
    pub inner_port: Option<u16>,
    pub launch_delay: Option<u32>,
    pub launch_timeout: Option<u32>,
}

impl SilverlightOptions {
    pub fn new(application_path: impl Into<String>) -> Self {
        Self {
            application_path: application_path.into(),
            ..Self::default()
        }
    }

    pub fn to_capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::new();
        caps.set(keys::APP, self.application_path.as_str());

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
        if let Some(port) = self.inner_port {
            caps.set(keys::INNER_PORT, port);
        }

        caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_application_path() {
        let caps = SilverlightOptions::new("app.xap").to_capabilities();
        assert_eq!(caps.to_json(), json!({ "app": "app.xap" }));
    }

    #[test]
    fn device_name_sent_once() {
        let options = SilverlightOptions {
            device_name: "Emulator 8.1".to_string(),
            inner_port: Some(9998),
            launch_delay: Some(250),
            launch_timeout: Some(30_000),
            debug_connect_to_running_app: Some(false),
            ..SilverlightOptions::new("app.xap")
        };
        let caps = options.to_capabilities();
        assert_eq!(
            caps.names(),
            vec![
                "app",
                "debugConnectToRunningApp",
                "deviceName",
                "launchTimeout",
                "launchDelay",
                "innerPort",
            ]
        );
        assert_eq!(caps.get("innerPort"), Some(&json!(9998)));
    }
}
