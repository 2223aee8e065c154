//! Per-backend session options and their capability rendering.
//!
//! # Architecture
//!
//! ```text
//! WiniumOptions::Desktop(DesktopOptions)         --to_capabilities()--> Capabilities
//! WiniumOptions::StoreApps(StoreAppsOptions)          |
//! WiniumOptions::Silverlight(SilverlightOptions)      +--variant()------> DriverVariant
//! ```
//!
//! The application path is required unless `debug_connect_to_running_app`
//! is `Some(true)`. Rendering never checks this; [`WiniumOptions::validate`]
//! does, and the session façade calls it before launching anything.

pub mod desktop;
pub mod silverlight;
pub mod store_apps;

use serde::Deserialize;
use winium_remote::Capabilities;

use crate::error::WiniumError;
use crate::service::DriverVariant;

pub use desktop::DesktopOptions;
pub use silverlight::SilverlightOptions;
pub use store_apps::StoreAppsOptions;

/// Capability names understood by the Winium drivers.
pub mod keys {
    pub const APP: &str = "app";
    pub const ARGS: &str = "args";
    pub const DEBUG_CONNECT_TO_RUNNING_APP: &str = "debugConnectToRunningApp";
    pub const KEYBOARD_SIMULATOR: &str = "keyboardSimulator";
    pub const LAUNCH_DELAY: &str = "launchDelay";
    pub const LAUNCH_TIMEOUT: &str = "launchTimeout";
    pub const DEVICE_NAME: &str = "deviceName";
    pub const INNER_PORT: &str = "innerPort";
    pub const FILES: &str = "files";
    pub const DEPENDENCIES: &str = "dependencies";
}

/// How the Desktop driver simulates keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyboardSimulator {
    /// `System.Windows.Forms.SendKeys`.
    BasedOnWindowsFormsSendKeysClass,
    /// The InputSimulator library.
    BasedOnInputSimulatorLib,
}

impl KeyboardSimulator {
    /// Numeric value sent in the `keyboardSimulator` capability.
    pub fn code(self) -> u8 {
        match self {
            Self::BasedOnWindowsFormsSendKeysClass => 0,
            Self::BasedOnInputSimulatorLib => 1,
        }
    }
}

/// Options for one of the three Winium backends.
#[derive(Debug, Clone, PartialEq)]
pub enum WiniumOptions {
    Desktop(DesktopOptions),
    StoreApps(StoreAppsOptions),
    Silverlight(SilverlightOptions),
}

impl WiniumOptions {
    /// The backend these options target.
    pub fn variant(&self) -> DriverVariant {
        match self {
            Self::Desktop(_) => DriverVariant::Desktop,
            Self::StoreApps(_) => DriverVariant::StoreApps,
            Self::Silverlight(_) => DriverVariant::Silverlight,
        }
    }

    /// Render the capability payload for session negotiation.
    pub fn to_capabilities(&self) -> Capabilities {
        match self {
            Self::Desktop(options) => options.to_capabilities(),
            Self::StoreApps(options) => options.to_capabilities(),
            Self::Silverlight(options) => options.to_capabilities(),
        }
    }

    /// Check the caller contract: an application path is required unless the
    /// driver is told to attach to an already running application.
    pub fn validate(&self) -> Result<(), WiniumError> {
        let (path, attach) = match self {
            Self::Desktop(o) => (&o.application_path, o.debug_connect_to_running_app),
            Self::StoreApps(o) => (&o.application_path, o.debug_connect_to_running_app),
            Self::Silverlight(o) => (&o.application_path, o.debug_connect_to_running_app),
        };
        if path.trim().is_empty() && attach != Some(true) {
            return Err(WiniumError::configuration(format!(
                "{} options need an application path unless debug_connect_to_running_app is set",
                self.variant()
            )));
        }
        Ok(())
    }
}

impl From<DesktopOptions> for WiniumOptions {
    fn from(options: DesktopOptions) -> Self {
        Self::Desktop(options)
    }
}

impl From<StoreAppsOptions> for WiniumOptions {
    fn from(options: StoreAppsOptions) -> Self {
        Self::StoreApps(options)
    }
}

impl From<SilverlightOptions> for WiniumOptions {
    fn from(options: SilverlightOptions) -> Self {
        Self::Silverlight(options)
    }
}
