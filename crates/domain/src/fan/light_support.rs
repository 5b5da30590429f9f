//! Capability changes implied by the `enable_light_support` setting.

use crate::capability::{CapabilitySet, HubCapability};
use crate::tuya::codes;

use super::FanProfile;

/// Add or remove a capability on the hub device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityChange {
    Add(HubCapability),
    Remove(HubCapability),
}

impl CapabilityChange {
    #[must_use]
    pub fn capability(self) -> HubCapability {
        match self {
            Self::Add(capability) | Self::Remove(capability) => capability,
        }
    }

    /// Apply the change to a local capability set.
    pub fn apply(self, set: &mut CapabilitySet) {
        match self {
            Self::Add(capability) => {
                set.insert(capability);
            }
            Self::Remove(capability) => {
                set.remove(capability);
            }
        }
    }
}

/// Capabilities removed when light support is disabled, in removal order.
pub const LIGHT_CAPABILITIES: [HubCapability; 6] = [
    HubCapability::OnoffLight,
    HubCapability::DimLight,
    HubCapability::LightMode,
    HubCapability::LightTemperature,
    HubCapability::LightHue,
    HubCapability::LightSaturation,
];

const LIGHT_CODES: [&str; 4] = [
    codes::LIGHT,
    codes::SWITCH_LED,
    codes::BRIGHT_VALUE,
    codes::TEMP_VALUE,
];

/// Plan the changes bringing `active` in line with the light setting.
///
/// Each step is checked against the set as updated by the previous steps,
/// so applying the returned changes in order never adds or removes a
/// capability twice. An already consistent set yields no change.
#[must_use]
pub fn plan_light_support(
    enabled: bool,
    profile: &FanProfile,
    active: &CapabilitySet,
) -> Vec<CapabilityChange> {
    let mut plan = Plan {
        projected: active.clone(),
        changes: Vec::new(),
    };

    if !enabled {
        for capability in LIGHT_CAPABILITIES {
            plan.remove(capability);
        }
        return plan.changes;
    }

    for code in LIGHT_CODES {
        if profile.has_tuya(code)
            && let Some(capability) = profile.map().capability_for(code)
        {
            plan.add(capability);
        }
    }

    if profile.has_tuya(codes::COLOUR) {
        plan.add(HubCapability::LightHue);
        plan.add(HubCapability::LightSaturation);
        plan.add(HubCapability::DimLight);
    }

    if plan.projected.contains(HubCapability::LightTemperature)
        && plan.projected.contains(HubCapability::LightHue)
    {
        plan.add(HubCapability::LightMode);
    }

    plan.changes
}

struct Plan {
    projected: CapabilitySet,
    changes: Vec<CapabilityChange>,
}

impl Plan {
    fn add(&mut self, capability: HubCapability) {
        if self.projected.insert(capability) {
            self.changes.push(CapabilityChange::Add(capability));
        }
    }

    fn remove(&mut self, capability: HubCapability) {
        if self.projected.remove(capability) {
            self.changes.push(CapabilityChange::Remove(capability));
        }
    }
}
