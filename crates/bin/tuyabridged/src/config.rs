//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `tuyabridge.toml` in the working directory, or the file named by
//! `TUYABRIDGE_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tuyabridge_domain::calibration::FanCalibration;
use tuyabridge_domain::capability::HubCapability;
use tuyabridge_domain::device::DeviceKind;

const DEFAULT_PATH: &str = "tuyabridge.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Per-device task settings.
    pub runtime: RuntimeConfig,
    /// Bridged devices.
    pub devices: Vec<DeviceConfig>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Device task configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Quiet period after the last light-group write before the batch is sent.
    pub light_debounce_ms: u64,
    /// Capacity of each device's event queue.
    pub channel_capacity: usize,
}

/// One bridged device.
#[derive(Debug, Deserialize)]
pub struct DeviceConfig {
    pub tuya_id: String,
    /// Display name, the Tuya id when absent.
    #[serde(default)]
    pub name: Option<String>,
    pub kind: DeviceKind,
    /// Tuya product category (`fsd`, `fs`, …).
    #[serde(default)]
    pub category: Option<String>,
    /// Tuya codes the device exposes.
    #[serde(default)]
    pub tuya_capabilities: Vec<String>,
    /// Hub capabilities exposed at startup.
    #[serde(default)]
    pub capabilities: Vec<HubCapability>,
    #[serde(default)]
    pub calibration: FanCalibration,
    /// Tuya specification JSON file. When set, its category, codes and
    /// ranges replace `category`, `tuya_capabilities` and `calibration`.
    #[serde(default)]
    pub specification: Option<PathBuf>,
    /// Initial device settings, as the hub would store them.
    #[serde(default = "empty_settings")]
    pub settings: serde_json::Value,
}

fn empty_settings() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Config {
    /// Load configuration from the config file (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("TUYABRIDGE_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TUYABRIDGE_LIGHT_DEBOUNCE_MS")
            && let Ok(ms) = val.parse()
        {
            self.runtime.light_debounce_ms = ms;
        }
        if let Ok(val) = std::env::var("TUYABRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.runtime.light_debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "light_debounce_ms must be non-zero".to_string(),
            ));
        }
        if self.runtime.channel_capacity == 0 {
            return Err(ConfigError::Validation(
                "channel_capacity must be non-zero".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for device in &self.devices {
            if device.tuya_id.is_empty() {
                return Err(ConfigError::Validation(
                    "device tuya_id must not be empty".to_string(),
                ));
            }
            if !seen.insert(device.tuya_id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate device tuya_id {}",
                    device.tuya_id
                )));
            }
        }
        Ok(())
    }

    /// Return the light debounce window.
    #[must_use]
    pub fn light_debounce(&self) -> Duration {
        Duration::from_millis(self.runtime.light_debounce_ms)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "tuyabridged=info,tuyabridge=info".to_string(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            light_debounce_ms: 150,
            channel_capacity: 32,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.runtime.light_debounce_ms, 150);
        assert_eq!(config.runtime.channel_capacity, 32);
        assert_eq!(config.light_debounce(), Duration::from_millis(150));
        assert!(config.devices.is_empty());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.runtime.light_debounce_ms, 150);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = r#"
            [logging]
            filter = 'debug'

            [runtime]
            light_debounce_ms = 200
            channel_capacity = 8

            [[devices]]
            tuya_id = 'bf01'
            name = 'Bedroom fan'
            kind = 'fan'
            category = 'fsd'
            tuya_capabilities = ['switch', 'fan_speed', 'light', 'bright_value']
            capabilities = ['onoff', 'dim', 'onoff.light']
            settings = { enable_light_support = true }

            [devices.calibration.brightness]
            min = 25
            max = 255

            [[devices]]
            tuya_id = 'ds01'
            kind = 'contact_sensor'
            capabilities = ['alarm_contact', 'measure_battery']
        "#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.runtime.light_debounce_ms, 200);
        assert_eq!(config.devices.len(), 2);

        let fan = &config.devices[0];
        assert_eq!(fan.kind, DeviceKind::Fan);
        assert_eq!(fan.category.as_deref(), Some("fsd"));
        assert_eq!(fan.capabilities[2], HubCapability::OnoffLight);
        assert!((fan.calibration.brightness.min - 25.0).abs() < f64::EPSILON);
        assert!((fan.calibration.temperature.max - 1000.0).abs() < f64::EPSILON);
        assert_eq!(fan.settings["enable_light_support"], serde_json::json!(true));

        let sensor = &config.devices[1];
        assert_eq!(sensor.kind, DeviceKind::ContactSensor);
        assert_eq!(sensor.settings, empty_settings());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.runtime.light_debounce_ms, 150);
    }

    #[test]
    fn should_reject_zero_debounce() {
        let mut config = Config::default();
        config.runtime.light_debounce_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_duplicate_devices() {
        let toml = "
            [[devices]]
            tuya_id = 'bf01'
            kind = 'fan'

            [[devices]]
            tuya_id = 'bf01'
            kind = 'contact_sensor'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_empty_tuya_id() {
        let config: Config = toml::from_str("[[devices]]\ntuya_id = ''\nkind = 'fan'").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_unknown_capability() {
        let toml = "
            [[devices]]
            tuya_id = 'bf01'
            kind = 'fan'
            capabilities = ['warp_drive']
        ";
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
