//! Client-side lifecycle and command surface for Winium drivers.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`options`] | Desktop / StoreApps / Silverlight options and capability rendering |
//! | [`service`] | Driver executable lifecycle, variants, free-port allocation |
//! | [`executor`] | Resolves a service or remote URL to a command executor |
//! | [`commands`] | The Winium extension command table |
//! | [`driver`] | `WiniumDriver` session façade and typed element helpers |
//! | [`config`] | TOML-loadable timeouts and host settings |
//! | [`error`] | `WiniumError` |

pub mod commands;
pub mod config;
pub mod driver;
pub mod error;
pub mod executor;
pub mod options;
pub mod service;

pub use commands::register_winium_commands;
pub use config::{DriverConfig, ServiceConfig};
pub use driver::{ElementId, Locator, WiniumDriver};
pub use error::WiniumError;
pub use executor::{Endpoint, resolve_executor};
pub use options::{
    DesktopOptions, KeyboardSimulator, SilverlightOptions, StoreAppsOptions, WiniumOptions,
};
pub use service::{DriverService, DriverVariant, find_free_port};
