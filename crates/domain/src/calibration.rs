//! Calibration — per-device vendor ranges and the conversions to and from
//! the hub's normalized `0..1` unit range.
//!
//! Conversions are not clamped. A calibration that does not match the values
//! a device actually reports yields out-of-range results; that is a data
//! problem to surface downstream, not something corrected here.

use serde::{Deserialize, Serialize};

/// Inclusive `{min, max}` bounds of one vendor channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSpec {
    pub min: f64,
    pub max: f64,
}

impl CalibrationSpec {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Vendor value → unit value: `(raw - min) / (max - min)`.
    #[must_use]
    pub fn normalize(self, raw: f64) -> f64 {
        (raw - self.min) / (self.max - self.min)
    }

    /// Unit value → vendor value: `min + unit * (max - min)`.
    #[must_use]
    pub fn denormalize(self, unit: f64) -> f64 {
        self.min + unit * (self.max - self.min)
    }
}

/// Sub-ranges of the composite `colour_data` channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColourCalibration {
    pub h: CalibrationSpec,
    pub s: CalibrationSpec,
    pub v: CalibrationSpec,
}

impl Default for ColourCalibration {
    fn default() -> Self {
        Self {
            h: CalibrationSpec::new(0.0, 360.0),
            s: CalibrationSpec::new(0.0, 1000.0),
            v: CalibrationSpec::new(0.0, 1000.0),
        }
    }
}

/// Calibration stored for a fan at provisioning time.
///
/// Defaults follow the Tuya v2 data-point ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FanCalibration {
    /// `bright_value` range.
    pub brightness: CalibrationSpec,
    /// `temp_value` range.
    pub temperature: CalibrationSpec,
    /// `colour_data` ranges.
    pub colour: ColourCalibration,
    /// Fan speed range, applied when speed is exposed through `dim`.
    /// Without it the raw speed passes through unchanged.
    pub speed: Option<CalibrationSpec>,
}

impl Default for FanCalibration {
    fn default() -> Self {
        Self {
            brightness: CalibrationSpec::new(10.0, 1000.0),
            temperature: CalibrationSpec::new(0.0, 1000.0),
            colour: ColourCalibration::default(),
            speed: None,
        }
    }
}
