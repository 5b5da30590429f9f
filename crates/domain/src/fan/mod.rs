//! Fan — multi-function fans with an optional integrated light.
//!
//! The translation is split in three pure steps:
//!
//! - [`reduce_status`] turns a Tuya status snapshot into hub state writes
//! - [`compose_light_commands`] / [`compose_command`] turn hub writes into
//!   Tuya command batches
//! - [`plan_light_support`] computes the capability changes implied by the
//!   `enable_light_support` setting
//!
//! All three read a [`FanProfile`], the per-instance data fixed at pairing
//! time: category, physical Tuya codes, calibration and the resolved map.

mod composer;
mod light_support;
mod reducer;

pub use composer::{LightWrite, compose_command, compose_light_commands, effective_mode};
pub use light_support::{CapabilityChange, LIGHT_CAPABILITIES, plan_light_support};
pub use reducer::reduce_status;

use crate::calibration::FanCalibration;
use crate::capability::HubCapability;
use crate::mapping::{CapabilityMap, FanCategory};
use crate::tuya::TuyaCapabilities;

/// Static per-instance description of a fan.
#[derive(Debug, Clone)]
pub struct FanProfile {
    pub category: FanCategory,
    pub tuya: TuyaCapabilities,
    pub calibration: FanCalibration,
    map: CapabilityMap,
}

impl FanProfile {
    #[must_use]
    pub fn new(
        category: FanCategory,
        tuya: TuyaCapabilities,
        calibration: FanCalibration,
    ) -> Self {
        let map = CapabilityMap::fan(&category, &tuya);
        Self {
            category,
            tuya,
            calibration,
            map,
        }
    }

    #[must_use]
    pub fn map(&self) -> &CapabilityMap {
        &self.map
    }

    /// Whether the device physically exposes a Tuya code.
    #[must_use]
    pub fn has_tuya(&self, code: &str) -> bool {
        self.tuya.contains(code)
    }

    /// Raw speed → hub value. Only `dim` is a unit range.
    fn speed_to_hub(&self, capability: HubCapability, raw: f64) -> f64 {
        match (capability, self.calibration.speed) {
            (HubCapability::Dim, Some(spec)) => spec.normalize(raw),
            _ => raw,
        }
    }

    /// Hub value → raw speed.
    fn speed_to_tuya(&self, capability: HubCapability, value: f64) -> f64 {
        match (capability, self.calibration.speed) {
            (HubCapability::Dim, Some(spec)) => spec.denormalize(value),
            _ => value,
        }
    }
}
