//! Device specification decoding, done once when a device is provisioned.
//!
//! The specification lists the data points a device exposes, each with a
//! type and a JSON-encoded `values` string:
//!
//! ```json
//! {"category": "fsd",
//!  "functions": [{"code": "bright_value", "type": "Integer",
//!                 "values": "{\"min\":10,\"max\":1000,\"scale\":0,\"step\":1}"}],
//!  "status": []}
//! ```

use serde::Deserialize;
use tuyabridge_domain::calibration::{CalibrationSpec, ColourCalibration, FanCalibration};
use tuyabridge_domain::mapping::FanCategory;
use tuyabridge_domain::tuya::{TuyaCapabilities, codes};

use crate::error::TuyaCodecError;

/// A raw device specification.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceSpecification {
    pub category: String,
    #[serde(default)]
    pub functions: Vec<SpecificationEntry>,
    #[serde(default)]
    pub status: Vec<SpecificationEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpecificationEntry {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub values: String,
}

/// What a fan needs from its specification.
#[derive(Debug, Clone, PartialEq)]
pub struct FanSpecification {
    pub category: FanCategory,
    pub tuya: TuyaCapabilities,
    pub calibration: FanCalibration,
}

#[derive(Deserialize)]
struct IntegerValues {
    min: f64,
    max: f64,
}

impl From<IntegerValues> for CalibrationSpec {
    fn from(values: IntegerValues) -> Self {
        Self::new(values.min, values.max)
    }
}

#[derive(Deserialize)]
struct ColourValues {
    h: IntegerValues,
    s: IntegerValues,
    v: IntegerValues,
}

const INTEGER: &str = "Integer";

impl DeviceSpecification {
    /// Decode a specification from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`TuyaCodecError::InvalidPayload`] when the text is not a
    /// specification.
    pub fn parse(payload: &str) -> Result<Self, TuyaCodecError> {
        serde_json::from_str(payload).map_err(TuyaCodecError::InvalidPayload)
    }

    /// Every code listed as a function or a status.
    #[must_use]
    pub fn codes(&self) -> TuyaCapabilities {
        self.entries().map(|entry| entry.code.as_str()).collect()
    }

    /// Extract the fan category, codes and calibration.
    ///
    /// Ranges missing from the specification keep their defaults. The speed
    /// range comes from the code that feeds `dim`: `fan_speed` for `fsd`
    /// fans, `fan_speed_percent` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`TuyaCodecError::InvalidSpecification`] when the values of
    /// a calibrated code cannot be parsed.
    pub fn to_fan(&self) -> Result<FanSpecification, TuyaCodecError> {
        let category = FanCategory::from_tag(&self.category);
        let mut calibration = FanCalibration::default();

        if let Some(spec) = self.integer_range(codes::BRIGHT_VALUE)? {
            calibration.brightness = spec;
        }
        if let Some(spec) = self.integer_range(codes::TEMP_VALUE)? {
            calibration.temperature = spec;
        }
        if let Some(entry) = self.find(codes::COLOUR_DATA) {
            let values: ColourValues = parse_values(entry)?;
            calibration.colour = ColourCalibration {
                h: values.h.into(),
                s: values.s.into(),
                v: values.v.into(),
            };
        }
        let speed_code = match category {
            FanCategory::CeilingFanLight => codes::FAN_SPEED,
            FanCategory::Fan | FanCategory::Other(_) => codes::FAN_SPEED_PERCENT,
        };
        calibration.speed = self.integer_range(speed_code)?;

        Ok(FanSpecification {
            tuya: self.codes(),
            calibration,
            category,
        })
    }

    fn entries(&self) -> impl Iterator<Item = &SpecificationEntry> {
        self.functions.iter().chain(self.status.iter())
    }

    fn find(&self, code: &str) -> Option<&SpecificationEntry> {
        self.entries().find(|entry| entry.code == code)
    }

    fn integer_range(&self, code: &str) -> Result<Option<CalibrationSpec>, TuyaCodecError> {
        match self.find(code) {
            Some(entry) if entry.kind == INTEGER => {
                let values: IntegerValues = parse_values(entry)?;
                Ok(Some(values.into()))
            }
            _ => Ok(None),
        }
    }
}

fn parse_values<T: serde::de::DeserializeOwned>(
    entry: &SpecificationEntry,
) -> Result<T, TuyaCodecError> {
    serde_json::from_str(&entry.values).map_err(|source| TuyaCodecError::InvalidSpecification {
        code: entry.code.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CEILING_FAN: &str = r#"{
        "category": "fsd",
        "functions": [
            {"code": "switch", "type": "Boolean", "values": "{}"},
            {"code": "fan_speed", "type": "Integer", "values": "{\"min\":1,\"max\":6,\"scale\":0,\"step\":1}"},
            {"code": "light", "type": "Boolean", "values": "{}"},
            {"code": "bright_value", "type": "Integer", "values": "{\"min\":25,\"max\":255,\"scale\":0,\"step\":1}"},
            {"code": "colour_data", "type": "Json", "values": "{\"h\":{\"min\":0,\"max\":360},\"s\":{\"min\":0,\"max\":255},\"v\":{\"min\":0,\"max\":255}}"}
        ],
        "status": [
            {"code": "temp_value", "type": "Integer", "values": "{\"min\":0,\"max\":255,\"scale\":0,\"step\":1}"}
        ]
    }"#;

    #[test]
    fn should_collect_function_and_status_codes() {
        let spec = DeviceSpecification::parse(CEILING_FAN).unwrap();

        let tuya = spec.codes();

        assert!(tuya.contains(codes::SWITCH));
        assert!(tuya.contains(codes::TEMP_VALUE));
        assert!(!tuya.contains(codes::WORK_MODE));
    }

    #[test]
    fn should_extract_fan_calibration() {
        let fan = DeviceSpecification::parse(CEILING_FAN)
            .unwrap()
            .to_fan()
            .unwrap();

        assert_eq!(fan.category, FanCategory::CeilingFanLight);
        assert_eq!(fan.calibration.brightness, CalibrationSpec::new(25.0, 255.0));
        assert_eq!(fan.calibration.temperature, CalibrationSpec::new(0.0, 255.0));
        assert_eq!(fan.calibration.colour.s, CalibrationSpec::new(0.0, 255.0));
        assert_eq!(fan.calibration.speed, Some(CalibrationSpec::new(1.0, 6.0)));
    }

    #[test]
    fn should_keep_defaults_for_missing_ranges() {
        let fan = DeviceSpecification::parse(r#"{"category": "fs", "functions": []}"#)
            .unwrap()
            .to_fan()
            .unwrap();

        assert_eq!(fan.category, FanCategory::Fan);
        assert_eq!(fan.calibration, FanCalibration::default());
    }

    #[test]
    fn should_ignore_enum_fan_speed() {
        let fan = DeviceSpecification::parse(
            r#"{"category": "fsd", "functions": [
                {"code": "fan_speed", "type": "Enum", "values": "{\"range\":[\"1\",\"2\",\"3\"]}"}
            ]}"#,
        )
        .unwrap()
        .to_fan()
        .unwrap();

        assert_eq!(fan.calibration.speed, None);
    }

    #[test]
    fn should_fail_on_malformed_values() {
        let spec = DeviceSpecification::parse(
            r#"{"category": "fs", "functions": [
                {"code": "bright_value", "type": "Integer", "values": "oops"}
            ]}"#,
        )
        .unwrap();

        assert!(matches!(
            spec.to_fan(),
            Err(TuyaCodecError::InvalidSpecification { code, .. }) if code == "bright_value"
        ));
    }
}
