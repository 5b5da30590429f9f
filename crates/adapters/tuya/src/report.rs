//! Status report decoding.
//!
//! A report looks like:
//!
//! ```json
//! {"devId": "bf01", "status": [{"code": "switch", "value": true, "t": 1700000000000}]}
//! ```
//!
//! Tuya delivers `colour_data` either as an object or as a JSON-encoded
//! string; both decode to [`ColourData`].

use serde::Deserialize;
use tuyabridge_domain::time::{Timestamp, from_millis};
use tuyabridge_domain::tuya::{ColourData, TuyaStatus, TuyaValue, codes};

use crate::error::TuyaCodecError;

/// One decoded status report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusReport {
    #[serde(rename = "devId")]
    pub dev_id: String,
    pub status: Vec<StatusEntry>,
}

/// One `{code, value, t}` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusEntry {
    pub code: String,
    pub value: serde_json::Value,
    #[serde(default)]
    pub t: Option<i64>,
}

impl StatusReport {
    /// Decode a report from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`TuyaCodecError::InvalidPayload`] when the text is not a
    /// status report.
    pub fn parse(payload: &str) -> Result<Self, TuyaCodecError> {
        serde_json::from_str(payload).map_err(TuyaCodecError::InvalidPayload)
    }

    /// Convert the entries into a status snapshot.
    ///
    /// Entries that cannot be decoded are skipped so the rest of the report
    /// still applies: unsupported JSON types (`null`, arrays, objects other
    /// than colour data) and malformed `colour_data` strings.
    #[must_use]
    pub fn to_status(&self) -> TuyaStatus {
        let mut status = TuyaStatus::new();
        for entry in &self.status {
            match decode_value(&entry.code, &entry.value) {
                Ok(Some(value)) => {
                    status.insert(entry.code.as_str(), value);
                }
                Ok(None) => tracing::debug!(
                    device = %self.dev_id,
                    code = %entry.code,
                    "skipping unsupported status value"
                ),
                Err(err) => tracing::warn!(
                    %err,
                    device = %self.dev_id,
                    code = %entry.code,
                    "skipping undecodable status value"
                ),
            }
        }
        status
    }

    /// Latest entry timestamp, when any entry carries a valid one.
    ///
    /// Out-of-range timestamps are ignored.
    #[must_use]
    pub fn reported_at(&self) -> Option<Timestamp> {
        self.status
            .iter()
            .filter_map(|entry| {
                let millis = entry.t?;
                let at = from_millis(millis);
                if at.is_none() {
                    let err = TuyaCodecError::InvalidTimestamp(millis);
                    tracing::warn!(
                        %err,
                        device = %self.dev_id,
                        code = %entry.code,
                        "ignoring status timestamp"
                    );
                }
                at
            })
            .max()
    }
}

fn decode_value(code: &str, value: &serde_json::Value) -> Result<Option<TuyaValue>, TuyaCodecError> {
    use serde_json::Value;

    let decoded = match value {
        Value::Bool(b) => Some(TuyaValue::Bool(*b)),
        Value::Number(n) => n.as_f64().map(TuyaValue::Number),
        Value::String(text) if code == codes::COLOUR_DATA => {
            Some(TuyaValue::Colour(parse_colour(code, text)?))
        }
        Value::String(text) => Some(TuyaValue::Text(text.clone())),
        Value::Object(_) => serde_json::from_value::<ColourData>(value.clone())
            .ok()
            .map(TuyaValue::Colour),
        Value::Null | Value::Array(_) => None,
    };
    Ok(decoded)
}

fn parse_colour(code: &str, text: &str) -> Result<ColourData, TuyaCodecError> {
    serde_json::from_str(text).map_err(|source| TuyaCodecError::InvalidColour {
        code: code.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_report_with_mixed_values() {
        let report = StatusReport::parse(
            r#"{"devId":"bf01","status":[
                {"code":"switch","value":true,"t":1700000000000},
                {"code":"fan_speed","value":3,"t":1700000000500},
                {"code":"work_mode","value":"white"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(report.dev_id, "bf01");
        let status = report.to_status();
        assert_eq!(status.get(codes::SWITCH), Some(&TuyaValue::Bool(true)));
        assert_eq!(status.get(codes::FAN_SPEED), Some(&TuyaValue::Number(3.0)));
        assert_eq!(status.get(codes::WORK_MODE), Some(&TuyaValue::from("white")));
        assert_eq!(
            report.reported_at(),
            from_millis(1_700_000_000_500)
        );
    }

    #[test]
    fn should_parse_stringified_colour_data() {
        let report = StatusReport::parse(
            r#"{"devId":"bf01","status":[{"code":"colour_data","value":"{\"h\":120,\"s\":500,\"v\":1000}"}]}"#,
        )
        .unwrap();

        let status = report.to_status();

        assert_eq!(
            status.get(codes::COLOUR_DATA),
            Some(&TuyaValue::Colour(ColourData {
                h: 120.0,
                s: 500.0,
                v: 1000.0
            }))
        );
    }

    #[test]
    fn should_parse_object_colour_data() {
        let report = StatusReport::parse(
            r#"{"devId":"bf01","status":[{"code":"colour_data","value":{"h":1,"s":2,"v":3}}]}"#,
        )
        .unwrap();

        let status = report.to_status();

        assert!(status.get(codes::COLOUR_DATA).and_then(TuyaValue::as_colour).is_some());
    }

    #[test]
    fn should_keep_sibling_entries_when_colour_string_is_malformed() {
        let report = StatusReport::parse(
            r#"{"devId":"bf01","status":[
                {"code":"switch","value":true},
                {"code":"colour_data","value":"garbage"}
            ]}"#,
        )
        .unwrap();

        let status = report.to_status();

        assert_eq!(status.get(codes::SWITCH), Some(&TuyaValue::Bool(true)));
        assert_eq!(status.get(codes::COLOUR_DATA), None);
        assert_eq!(status.len(), 1);
    }

    #[test]
    fn should_ignore_out_of_range_timestamp() {
        let report = StatusReport::parse(
            r#"{"devId":"bf01","status":[
                {"code":"switch","value":true,"t":1700000000000},
                {"code":"fan_speed","value":2,"t":9223372036854775807}
            ]}"#,
        )
        .unwrap();

        assert_eq!(report.reported_at(), from_millis(1_700_000_000_000));
        assert_eq!(report.to_status().len(), 2);
    }

    #[test]
    fn should_skip_null_values() {
        let report =
            StatusReport::parse(r#"{"devId":"bf01","status":[{"code":"countdown","value":null}]}"#)
                .unwrap();

        assert!(report.to_status().is_empty());
        assert_eq!(report.reported_at(), None);
    }

    #[test]
    fn should_reject_payload_without_device_id() {
        let result = StatusReport::parse(r#"{"status":[]}"#);
        assert!(matches!(result, Err(TuyaCodecError::InvalidPayload(_))));
    }
}
