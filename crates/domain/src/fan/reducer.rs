//! Tuya status snapshot → hub state writes.

use crate::capability::{CapabilitySet, CapabilityValue, CapabilityWrite, HubCapability, LightMode};
use crate::tuya::{TuyaStatus, TuyaValue, codes, work_mode};

use super::FanProfile;

/// Reduce one status snapshot into the hub writes it implies.
///
/// Writes are produced in application order and only for capabilities in
/// `active`. Unmapped codes are skipped. The light mode is recomputed from
/// `work_mode` on every call, even when `work_mode` did not change.
#[must_use]
pub fn reduce_status(
    profile: &FanProfile,
    active: &CapabilitySet,
    status: &TuyaStatus,
) -> Vec<CapabilityWrite> {
    let mut out = Writes {
        active,
        writes: Vec::new(),
    };

    for (code, value) in status.iter() {
        let Some(capability) = profile.map().readable(code) else {
            continue;
        };
        let value = match value {
            TuyaValue::Bool(b) => CapabilityValue::Bool(*b),
            TuyaValue::Number(n) => CapabilityValue::Number(profile.speed_to_hub(capability, *n)),
            TuyaValue::Text(text) => CapabilityValue::Text(text.clone()),
            TuyaValue::Colour(_) => continue,
        };
        out.push(capability, value);
    }

    let raw_mode = status.get(codes::WORK_MODE);
    let mode = raw_mode.and_then(TuyaValue::as_str);
    let calibration = &profile.calibration;

    let light_mode = match mode {
        Some(work_mode::WHITE) => Some(LightMode::Temperature),
        Some(work_mode::COLOUR) => Some(LightMode::Color),
        _ => None,
    };
    out.push(HubCapability::LightMode, light_mode.into());

    if let Some(temp) = status.get(codes::TEMP_VALUE).and_then(TuyaValue::truthy_number) {
        out.push(
            HubCapability::LightTemperature,
            calibration.temperature.normalize(temp).into(),
        );
    }

    if let Some(bright) = status.get(codes::BRIGHT_VALUE).and_then(TuyaValue::truthy_number)
        && (raw_mode.is_none() || mode == Some(work_mode::WHITE))
    {
        out.push(
            HubCapability::DimLight,
            calibration.brightness.normalize(bright).into(),
        );
    }

    if let Some(colour) = status.get(codes::COLOUR_DATA).and_then(TuyaValue::as_colour) {
        let specs = calibration.colour;
        out.push(HubCapability::LightHue, specs.h.normalize(colour.h).into());
        out.push(HubCapability::LightSaturation, specs.s.normalize(colour.s).into());

        if mode == Some(work_mode::COLOUR) {
            out.push(HubCapability::DimLight, specs.v.normalize(colour.v).into());
        }
    }

    out.writes
}

struct Writes<'a> {
    active: &'a CapabilitySet,
    writes: Vec<CapabilityWrite>,
}

impl Writes<'_> {
    fn push(&mut self, capability: HubCapability, value: CapabilityValue) {
        if self.active.contains(capability) {
            self.writes.push(CapabilityWrite { capability, value });
        }
    }
}
