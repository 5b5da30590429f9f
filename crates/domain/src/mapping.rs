//! Capability mapping — which Tuya code feeds / is fed by which hub capability.
//!
//! The static tables below describe each device class. A [`CapabilityMap`] is
//! resolved once per device instance from the table, the device category and
//! the Tuya codes the device physically exposes, so that status and command
//! handling never branch on the category again.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capability::HubCapability;
use crate::tuya::{TuyaCapabilities, codes};

/// Direction(s) in which a mapped Tuya code is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessMode {
    #[must_use]
    pub fn is_readable(self) -> bool {
        matches!(self, Self::ReadOnly | Self::ReadWrite)
    }

    #[must_use]
    pub fn is_writable(self) -> bool {
        matches!(self, Self::WriteOnly | Self::ReadWrite)
    }
}

/// One row of a static mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingEntry {
    pub code: &'static str,
    pub capability: HubCapability,
    pub access: AccessMode,
}

const fn entry(code: &'static str, capability: HubCapability, access: AccessMode) -> MappingEntry {
    MappingEntry {
        code,
        capability,
        access,
    }
}

/// Fan table. `fan_speed` is missing on purpose: its target depends on the
/// [`FanCategory`] and is added by [`CapabilityMap::fan`].
///
/// `bright_value` and `temp_value` are write-only here: they are read
/// through the light derivation, which normalizes them.
pub const FAN_MAPPING: &[MappingEntry] = &[
    entry(codes::SWITCH, HubCapability::Onoff, AccessMode::ReadWrite),
    entry(codes::FAN_SPEED_PERCENT, HubCapability::Dim, AccessMode::ReadWrite),
    entry(codes::LIGHT, HubCapability::OnoffLight, AccessMode::ReadWrite),
    entry(codes::SWITCH_LED, HubCapability::OnoffLight, AccessMode::ReadWrite),
    entry(codes::BRIGHT_VALUE, HubCapability::DimLight, AccessMode::WriteOnly),
    entry(codes::TEMP_VALUE, HubCapability::LightTemperature, AccessMode::WriteOnly),
];

/// Contact sensor table.
pub const CONTACT_SENSOR_MAPPING: &[MappingEntry] = &[
    entry(codes::DOORCONTACT_STATE, HubCapability::AlarmContact, AccessMode::ReadOnly),
    entry(codes::BATTERY_PERCENTAGE, HubCapability::MeasureBattery, AccessMode::ReadOnly),
    entry(codes::BATTERY_STATE, HubCapability::AlarmBattery, AccessMode::ReadOnly),
    entry(codes::TEMPER_ALARM, HubCapability::AlarmTamper, AccessMode::ReadOnly),
];

/// Tuya product category of a fan, as stored at pairing time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FanCategory {
    /// Category `fsd`: speed is exposed through the plain `dim` capability.
    CeilingFanLight,
    /// Any other category; speed uses `legacy_fan_speed`.
    #[default]
    Fan,
    /// Unknown tags are kept so they serialize back unchanged.
    Other(String),
}

impl FanCategory {
    pub const CEILING_FAN_LIGHT_TAG: &'static str = "fsd";
    pub const FAN_TAG: &'static str = "fs";

    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            Self::CEILING_FAN_LIGHT_TAG => Self::CeilingFanLight,
            Self::FAN_TAG => Self::Fan,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::CeilingFanLight => Self::CEILING_FAN_LIGHT_TAG,
            Self::Fan => Self::FAN_TAG,
            Self::Other(tag) => tag,
        }
    }

    /// Hub capability that carries `fan_speed` for this category.
    #[must_use]
    pub fn fan_speed_capability(&self) -> HubCapability {
        match self {
            Self::CeilingFanLight => HubCapability::Dim,
            Self::Fan | Self::Other(_) => HubCapability::LegacyFanSpeed,
        }
    }
}

impl From<String> for FanCategory {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<FanCategory> for String {
    fn from(category: FanCategory) -> Self {
        category.tag().to_string()
    }
}

impl fmt::Display for FanCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Per-instance lookup table resolved from a static mapping.
#[derive(Debug, Clone, Default)]
pub struct CapabilityMap {
    by_code: BTreeMap<&'static str, MappingEntry>,
    commands: BTreeMap<HubCapability, &'static str>,
}

impl CapabilityMap {
    /// Resolve the fan table for one device.
    ///
    /// Writable hub capabilities route to the Tuya code the device exposes;
    /// when two codes feed the same capability (`light` / `switch_led`) the
    /// later row wins. `fan_speed` always routes to the category's speed
    /// capability, whether or not the device lists it.
    #[must_use]
    pub fn fan(category: &FanCategory, tuya: &TuyaCapabilities) -> Self {
        let mut map = Self::resolve(FAN_MAPPING, tuya);
        let speed = entry(
            codes::FAN_SPEED,
            category.fan_speed_capability(),
            AccessMode::ReadWrite,
        );
        map.by_code.insert(speed.code, speed);
        map.commands.insert(speed.capability, speed.code);
        map
    }

    /// Resolve the contact sensor table.
    #[must_use]
    pub fn contact_sensor() -> Self {
        Self::resolve(CONTACT_SENSOR_MAPPING, &TuyaCapabilities::default())
    }

    fn resolve(table: &[MappingEntry], tuya: &TuyaCapabilities) -> Self {
        let mut map = Self::default();
        for row in table {
            map.by_code.insert(row.code, *row);
            if row.access == AccessMode::ReadWrite && tuya.contains(row.code) {
                map.commands.insert(row.capability, row.code);
            }
        }
        map
    }

    /// Hub capability registered for a code, whatever its access mode.
    #[must_use]
    pub fn capability_for(&self, code: &str) -> Option<HubCapability> {
        self.by_code.get(code).map(|row| row.capability)
    }

    /// Access mode of a code, `None` when unmapped.
    #[must_use]
    pub fn access(&self, code: &str) -> Option<AccessMode> {
        self.by_code.get(code).map(|row| row.access)
    }

    /// Target capability for a status field, when the code may be read.
    #[must_use]
    pub fn readable(&self, code: &str) -> Option<HubCapability> {
        self.by_code
            .get(code)
            .filter(|row| row.access.is_readable())
            .map(|row| row.capability)
    }

    #[must_use]
    pub fn is_read_write(&self, code: &str) -> bool {
        self.access(code) == Some(AccessMode::ReadWrite)
    }

    /// Tuya code a single-capability write is sent to.
    #[must_use]
    pub fn command_code(&self, capability: HubCapability) -> Option<&'static str> {
        self.commands.get(&capability).copied()
    }
}
