//! Per-device settings as delivered by the hub's settings framework.

use serde::{Deserialize, Serialize};

/// A settings change: the keys that changed and the full new settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsChange<S> {
    pub changed_keys: Vec<String>,
    pub new_settings: S,
}

impl<S> SettingsChange<S> {
    #[must_use]
    pub fn new(changed_keys: Vec<String>, new_settings: S) -> Self {
        Self {
            changed_keys,
            new_settings,
        }
    }

    #[must_use]
    pub fn has_changed(&self, key: &str) -> bool {
        self.changed_keys.iter().any(|k| k == key)
    }
}

/// Fan settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FanSettings {
    /// Expose the integrated light's capabilities.
    pub enable_light_support: bool,
}

impl FanSettings {
    pub const ENABLE_LIGHT_SUPPORT: &'static str = "enable_light_support";
}

/// Contact sensor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSensorSettings {
    /// Treat reports as one-shot triggers: only changed reports raise the
    /// alarm, which then clears itself after [`alarm_timeout`](Self::alarm_timeout).
    pub use_alarm_timeout: bool,
    /// Seconds before a raised alarm is cleared in timeout mode.
    pub alarm_timeout: u64,
}

impl ContactSensorSettings {
    pub const USE_ALARM_TIMEOUT: &'static str = "use_alarm_timeout";
    pub const ALARM_TIMEOUT: &'static str = "alarm_timeout";
}

impl Default for ContactSensorSettings {
    fn default() -> Self {
        Self {
            use_alarm_timeout: false,
            alarm_timeout: 10,
        }
    }
}
