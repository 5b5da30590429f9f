//! Tuya-side values: status snapshots and command batches.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Tuya capability codes the bridge knows about.
///
/// Any other code may appear in a status report; it is ignored.
pub mod codes {
    pub const SWITCH: &str = "switch";
    pub const FAN_SPEED: &str = "fan_speed";
    pub const FAN_SPEED_PERCENT: &str = "fan_speed_percent";
    pub const LIGHT: &str = "light";
    pub const SWITCH_LED: &str = "switch_led";
    pub const BRIGHT_VALUE: &str = "bright_value";
    pub const TEMP_VALUE: &str = "temp_value";
    pub const COLOUR: &str = "colour";
    pub const COLOUR_DATA: &str = "colour_data";
    pub const WORK_MODE: &str = "work_mode";
    pub const DOORCONTACT_STATE: &str = "doorcontact_state";
    pub const BATTERY_PERCENTAGE: &str = "battery_percentage";
    pub const BATTERY_STATE: &str = "battery_state";
    pub const TEMPER_ALARM: &str = "temper_alarm";
}

/// `work_mode` values with a light-mode meaning.
pub mod work_mode {
    pub const WHITE: &str = "white";
    pub const COLOUR: &str = "colour";
}

/// Composite colour value carried by `colour_data`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColourData {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

/// A raw Tuya status or command value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TuyaValue {
    Bool(bool),
    Number(f64),
    Colour(ColourData),
    Text(String),
}

impl TuyaValue {
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_colour(&self) -> Option<ColourData> {
        match self {
            Self::Colour(colour) => Some(*colour),
            _ => None,
        }
    }

    /// A number that is neither zero nor NaN.
    ///
    /// Zero brightness / temperature reports mean "no update".
    #[must_use]
    pub fn truthy_number(&self) -> Option<f64> {
        self.as_number().filter(|n| *n != 0.0 && !n.is_nan())
    }
}

impl From<bool> for TuyaValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for TuyaValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<ColourData> for TuyaValue {
    fn from(value: ColourData) -> Self {
        Self::Colour(value)
    }
}

impl From<&str> for TuyaValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Point-in-time snapshot of a device's Tuya status, keyed by code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TuyaStatus(BTreeMap<String, TuyaValue>);

impl TuyaStatus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, code: &str) -> Option<&TuyaValue> {
        self.0.get(code)
    }

    /// Store a value, returning the previous one.
    pub fn insert(
        &mut self,
        code: impl Into<String>,
        value: impl Into<TuyaValue>,
    ) -> Option<TuyaValue> {
        self.0.insert(code.into(), value.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TuyaValue)> {
        self.0.iter().map(|(code, value)| (code.as_str(), value))
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

impl<K: Into<String>, V: Into<TuyaValue>> FromIterator<(K, V)> for TuyaStatus {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(code, value)| (code.into(), value.into()))
                .collect(),
        )
    }
}

/// A status snapshot together with the codes that changed since the previous one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusUpdate {
    pub status: TuyaStatus,
    pub changed: Vec<String>,
}

impl StatusUpdate {
    #[must_use]
    pub fn new(status: TuyaStatus, changed: Vec<String>) -> Self {
        Self { status, changed }
    }

    #[must_use]
    pub fn has_changed(&self, code: &str) -> bool {
        self.changed.iter().any(|c| c == code)
    }
}

/// A single `{code, value}` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuyaCommand {
    pub code: String,
    pub value: TuyaValue,
}

/// Ordered commands sent in one request, at most one per code.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CommandBatch(Vec<TuyaCommand>);

impl CommandBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command, replacing in place any earlier command for the same code.
    pub fn push(&mut self, code: impl Into<String>, value: impl Into<TuyaValue>) {
        let code = code.into();
        let value = value.into();
        if let Some(existing) = self.0.iter_mut().find(|cmd| cmd.code == code) {
            existing.value = value;
        } else {
            self.0.push(TuyaCommand { code, value });
        }
    }

    #[must_use]
    pub fn get(&self, code: &str) -> Option<&TuyaValue> {
        self.0
            .iter()
            .find(|cmd| cmd.code == code)
            .map(|cmd| &cmd.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TuyaCommand> {
        self.0.iter()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|cmd| cmd.code.as_str())
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

impl From<TuyaCommand> for CommandBatch {
    fn from(command: TuyaCommand) -> Self {
        Self(vec![command])
    }
}

impl IntoIterator for CommandBatch {
    type Item = TuyaCommand;
    type IntoIter = std::vec::IntoIter<TuyaCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Tuya codes physically present on a device instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TuyaCapabilities(BTreeSet<String>);

impl TuyaCapabilities {
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.0.contains(code)
    }

    pub fn insert(&mut self, code: impl Into<String>) {
        self.0.insert(code.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for TuyaCapabilities {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
