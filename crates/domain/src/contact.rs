//! Contact sensor status handling.

use crate::capability::{CapabilitySet, CapabilityValue, CapabilityWrite, HubCapability};
use crate::mapping::CapabilityMap;
use crate::settings::ContactSensorSettings;
use crate::tuya::{StatusUpdate, TuyaValue, codes};

/// `battery_state` value that raises the battery alarm.
pub const BATTERY_STATE_LOW: &str = "low";

/// Reduce a sensor status update into hub writes.
///
/// With `use_alarm_timeout` on, the contact alarm is only raised by a
/// `doorcontact_state` listed as changed, and reported `false` values are
/// dropped: the caller clears the alarm when its timeout expires.
#[must_use]
pub fn reduce_status(
    map: &CapabilityMap,
    active: &CapabilitySet,
    settings: &ContactSensorSettings,
    update: &StatusUpdate,
) -> Vec<CapabilityWrite> {
    let mut writes = Vec::new();

    for (code, value) in update.status.iter() {
        let Some(capability) = map.readable(code) else {
            continue;
        };
        if !active.contains(capability) {
            continue;
        }
        let value = match (code, value) {
            (codes::DOORCONTACT_STATE, TuyaValue::Bool(open)) => {
                if settings.use_alarm_timeout && (!open || !update.has_changed(code)) {
                    continue;
                }
                CapabilityValue::Bool(*open)
            }
            (codes::BATTERY_STATE, TuyaValue::Text(state)) => {
                CapabilityValue::Bool(state == BATTERY_STATE_LOW)
            }
            (codes::BATTERY_PERCENTAGE, TuyaValue::Number(level)) => CapabilityValue::Number(*level),
            (codes::TEMPER_ALARM, TuyaValue::Bool(tampered)) => CapabilityValue::Bool(*tampered),
            _ => continue,
        };
        writes.push(CapabilityWrite { capability, value });
    }

    writes
}

/// Whether the writes raise the contact alarm, arming the reset timeout.
#[must_use]
pub fn raises_contact_alarm(writes: &[CapabilityWrite]) -> bool {
    writes.iter().any(|write| {
        write.capability == HubCapability::AlarmContact && write.value == CapabilityValue::Bool(true)
    })
}
