use std::fmt;
use std::str::FromStr;

use crate::error::WiniumError;

/// Download reference used by services created for a custom executable.
pub const DEFAULT_DOWNLOAD_URL: &str = "https://github.com/2gis/Winium";

/// The three Winium backends, each with its own driver executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverVariant {
    Desktop,
    StoreApps,
    Silverlight,
}

impl DriverVariant {
    pub const ALL: [DriverVariant; 3] = [Self::Desktop, Self::StoreApps, Self::Silverlight];

    /// File name of the driver executable for this backend.
    pub fn executable_file_name(self) -> &'static str {
        match self {
            Self::Desktop => "Winium.Desktop.Driver.exe",
            Self::StoreApps => "Winium.StoreApps.Driver.exe",
            Self::Silverlight => "WindowsPhoneDriver.OuterDriver.exe",
        }
    }

    /// Where the driver executable can be downloaded. Informational only.
    pub fn download_url(self) -> &'static str {
        match self {
            Self::Desktop => "https://github.com/2gis/Winium.Desktop/releases",
            Self::StoreApps => "https://github.com/2gis/Winium.StoreApps/releases",
            Self::Silverlight => "https://github.com/2gis/winphonedriver/releases",
        }
    }

    /// Short name used in configuration and log output.
    pub fn name(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::StoreApps => "store-apps",
            Self::Silverlight => "silverlight",
        }
    }
}

impl fmt::Display for DriverVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DriverVariant {
    type Err = WiniumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desktop" => Ok(Self::Desktop),
            "store-apps" | "storeapps" | "store_apps" => Ok(Self::StoreApps),
            "silverlight" => Ok(Self::Silverlight),
            other => Err(WiniumError::configuration(format!(
                "unknown driver variant {other:?} (expected \"desktop\", \"store-apps\" or \"silverlight\")"
            ))),
        }
    }
}
