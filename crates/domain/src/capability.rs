//! Hub capabilities — the normalized attributes a device exposes to the hub.
//!
//! A capability id may carry a `.suffix` naming a secondary instance on a
//! multi-function device (`dim.light` is the light's brightness on a fan that
//! also uses `dim` for its speed).

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Closed set of hub capabilities known to the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HubCapability {
    #[serde(rename = "onoff")]
    Onoff,
    #[serde(rename = "dim")]
    Dim,
    #[serde(rename = "legacy_fan_speed")]
    LegacyFanSpeed,
    #[serde(rename = "onoff.light")]
    OnoffLight,
    #[serde(rename = "dim.light")]
    DimLight,
    #[serde(rename = "light_hue")]
    LightHue,
    #[serde(rename = "light_saturation")]
    LightSaturation,
    #[serde(rename = "light_temperature")]
    LightTemperature,
    #[serde(rename = "light_mode")]
    LightMode,
    #[serde(rename = "alarm_contact")]
    AlarmContact,
    #[serde(rename = "measure_battery")]
    MeasureBattery,
    #[serde(rename = "alarm_battery")]
    AlarmBattery,
    #[serde(rename = "alarm_tamper")]
    AlarmTamper,
}

impl HubCapability {
    pub const ALL: [Self; 13] = [
        Self::Onoff,
        Self::Dim,
        Self::LegacyFanSpeed,
        Self::OnoffLight,
        Self::DimLight,
        Self::LightHue,
        Self::LightSaturation,
        Self::LightTemperature,
        Self::LightMode,
        Self::AlarmContact,
        Self::MeasureBattery,
        Self::AlarmBattery,
        Self::AlarmTamper,
    ];

    /// The hub-side string id.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Onoff => "onoff",
            Self::Dim => "dim",
            Self::LegacyFanSpeed => "legacy_fan_speed",
            Self::OnoffLight => "onoff.light",
            Self::DimLight => "dim.light",
            Self::LightHue => "light_hue",
            Self::LightSaturation => "light_saturation",
            Self::LightTemperature => "light_temperature",
            Self::LightMode => "light_mode",
            Self::AlarmContact => "alarm_contact",
            Self::MeasureBattery => "measure_battery",
            Self::AlarmBattery => "alarm_battery",
            Self::AlarmTamper => "alarm_tamper",
        }
    }

    /// Capabilities written together through the debounced light group.
    #[must_use]
    pub fn is_light_group(self) -> bool {
        matches!(
            self,
            Self::DimLight
                | Self::LightHue
                | Self::LightSaturation
                | Self::LightTemperature
                | Self::LightMode
        )
    }
}

impl fmt::Display for HubCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HubCapability {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|cap| cap.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownCapability(s.to_string()))
    }
}

/// Light mode exposed through [`HubCapability::LightMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightMode {
    Color,
    Temperature,
}

impl LightMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Temperature => "temperature",
        }
    }
}

impl FromStr for LightMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "color" => Ok(Self::Color),
            "temperature" => Ok(Self::Temperature),
            _ => Err(ValidationError::InvalidValue {
                capability: HubCapability::LightMode,
                expected: "\"color\" or \"temperature\"",
            }),
        }
    }
}

/// A normalized hub capability value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapabilityValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Null,
}

impl CapabilityValue {
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Interpret a [`Text`](Self::Text) value as a [`LightMode`].
    #[must_use]
    pub fn as_light_mode(&self) -> Option<LightMode> {
        match self {
            Self::Text(text) => text.parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<bool> for CapabilityValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for CapabilityValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<LightMode> for CapabilityValue {
    fn from(value: LightMode) -> Self {
        Self::Text(value.as_str().to_string())
    }
}

impl From<Option<LightMode>> for CapabilityValue {
    fn from(value: Option<LightMode>) -> Self {
        value.map_or(Self::Null, Self::from)
    }
}

/// One hub state write produced by a status reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityWrite {
    pub capability: HubCapability,
    pub value: CapabilityValue,
}

impl CapabilityWrite {
    #[must_use]
    pub fn new(capability: HubCapability, value: impl Into<CapabilityValue>) -> Self {
        Self {
            capability,
            value: value.into(),
        }
    }
}

/// The capabilities a device instance currently exposes.
///
/// Only the capability set manager adds or removes entries; status and
/// command handling read it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<HubCapability>);

impl CapabilitySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, capability: HubCapability) -> bool {
        self.0.contains(&capability)
    }

    /// Returns `true` when the capability was not present before.
    pub fn insert(&mut self, capability: HubCapability) -> bool {
        self.0.insert(capability)
    }

    /// Returns `true` when the capability was present.
    pub fn remove(&mut self, capability: HubCapability) -> bool {
        self.0.remove(&capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = HubCapability> + '_ {
        self.0.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<HubCapability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = HubCapability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Hub-side mirror of the last known value of each capability.
#[derive(Debug, Clone, Default)]
pub struct CapabilityState(HashMap<HubCapability, CapabilityValue>);

impl CapabilityState {
    #[must_use]
    pub fn get(&self, capability: HubCapability) -> Option<&CapabilityValue> {
        self.0.get(&capability)
    }

    /// Numeric value of a capability, `None` when unset or not a number.
    #[must_use]
    pub fn number(&self, capability: HubCapability) -> Option<f64> {
        self.get(capability).and_then(CapabilityValue::as_f64)
    }

    #[must_use]
    pub fn light_mode(&self) -> Option<LightMode> {
        self.get(HubCapability::LightMode)
            .and_then(CapabilityValue::as_light_mode)
    }

    pub fn set(&mut self, capability: HubCapability, value: CapabilityValue) {
        self.0.insert(capability, value);
    }

    pub fn remove(&mut self, capability: HubCapability) {
        self.0.remove(&capability);
    }
}
