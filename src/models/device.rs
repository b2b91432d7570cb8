// Device identity: system info of the polled firewall and Panorama-managed devices

use serde::{Deserialize, Serialize};

/// Identity and clock of the polled device, from `show system info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SystemInfo {
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub sw_version: String,
    /// Device wall clock, e.g. "Thu Jun  1 14:22:05 2023" or "2023/06/01 14:22:05".
    #[serde(default)]
    pub time: String,
}

/// One firewall known to Panorama.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedDevice {
    pub serial: String,
    pub sw_version: String,
}
