//! Newline-delimited JSON event stream.
//!
//! Each stdin line is one inbound event, tagged by `type`:
//!
//! ```json
//! {"type":"status","devId":"bf01","status":[{"code":"switch","value":true}]}
//! {"type":"write","device":"bf01","capability":"dim.light","value":0.5}
//! {"type":"settings","device":"bf01","changed_keys":["enable_light_support"],"settings":{"enable_light_support":true}}
//! {"type":"snapshot","device":"bf01"}
//! ```
//!
//! Each event yields one response line on stdout.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tuyabridge_adapter_tuya::StatusReport;
use tuyabridge_app::services::DeviceSnapshot;
use tuyabridge_domain::capability::{CapabilityValue, HubCapability};
use tuyabridge_domain::time::Timestamp;

/// One inbound event.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// A Tuya status report.
    Status(StatusReport),
    /// A hub-side capability write.
    Write {
        device: String,
        capability: HubCapability,
        value: CapabilityValue,
    },
    /// A hub-side settings change.
    Settings {
        device: String,
        changed_keys: Vec<String>,
        settings: serde_json::Value,
    },
    /// A query for the current capability values.
    Snapshot { device: String },
}

impl InboundEvent {
    /// Tuya id of the device the event targets.
    #[must_use]
    pub fn device(&self) -> &str {
        match self {
            Self::Status(report) => &report.dev_id,
            Self::Write { device, .. }
            | Self::Settings { device, .. }
            | Self::Snapshot { device } => device,
        }
    }
}

/// One outbound response.
#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Ok {
        device: String,
    },
    Error {
        device: Option<String>,
        message: String,
    },
    Snapshot {
        device: String,
        values: BTreeMap<HubCapability, CapabilityValue>,
        /// Latest Tuya report time seen for the device.
        last_report: Option<Timestamp>,
    },
}

impl Response {
    /// Current value of every active capability; unset values are `null`.
    #[must_use]
    pub fn snapshot(snapshot: &DeviceSnapshot, last_report: Option<Timestamp>) -> Self {
        let values = snapshot
            .active
            .iter()
            .map(|capability| {
                let value = snapshot
                    .state
                    .get(capability)
                    .cloned()
                    .unwrap_or(CapabilityValue::Null);
                (capability, value)
            })
            .collect();
        Self::Snapshot {
            device: snapshot.device.tuya_id.clone(),
            values,
            last_report,
        }
    }

    /// Render an error with its whole source chain.
    pub fn error(device: Option<String>, err: &dyn std::error::Error) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::Error { device, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuyabridge_domain::capability::{CapabilitySet, CapabilityState};
    use tuyabridge_domain::device::Device;

    #[test]
    fn should_parse_status_event() {
        let event: InboundEvent = serde_json::from_str(
            r#"{"type":"status","devId":"bf01","status":[{"code":"switch","value":true}]}"#,
        )
        .unwrap();

        assert_eq!(event.device(), "bf01");
        assert!(matches!(event, InboundEvent::Status(report) if report.status.len() == 1));
    }

    #[test]
    fn should_parse_write_event_with_integer_value() {
        let event: InboundEvent = serde_json::from_str(
            r#"{"type":"write","device":"bf01","capability":"dim.light","value":1}"#,
        )
        .unwrap();

        match event {
            InboundEvent::Write {
                capability, value, ..
            } => {
                assert_eq!(capability, HubCapability::DimLight);
                assert_eq!(value.as_f64(), Some(1.0));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn should_parse_settings_event() {
        let event: InboundEvent = serde_json::from_str(
            r#"{"type":"settings","device":"ds01","changed_keys":["use_alarm_timeout"],"settings":{"use_alarm_timeout":true}}"#,
        )
        .unwrap();

        assert!(matches!(
            event,
            InboundEvent::Settings { ref changed_keys, .. } if changed_keys == &["use_alarm_timeout"]
        ));
    }

    #[test]
    fn should_reject_unknown_event_type() {
        let result: Result<InboundEvent, _> =
            serde_json::from_str(r#"{"type":"reboot","device":"bf01"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn should_render_snapshot_with_null_for_unset_values() {
        let device = Device::builder().tuya_id("bf01").build().unwrap();
        let mut state = CapabilityState::default();
        state.set(HubCapability::Onoff, true.into());
        let active: CapabilitySet = [HubCapability::Onoff, HubCapability::Dim].into_iter().collect();

        let response = Response::snapshot(
            &DeviceSnapshot {
                device,
                active,
                state,
            },
            None,
        );

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({
                "type": "snapshot",
                "device": "bf01",
                "values": {"onoff": true, "dim": null},
                "last_report": null
            })
        );
    }

    #[test]
    fn should_serialize_ok_response() {
        let response = Response::Ok {
            device: "bf01".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"type":"ok","device":"bf01"}"#
        );
    }
}
