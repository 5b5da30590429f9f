//! Device — one Tuya device instance bridged to the hub.

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, ValidationError};
use crate::id::DeviceId;

/// Device class handled by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Fan,
    ContactSensor,
}

/// Identity of a bridged device on both sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    /// Tuya device id (`devId`).
    pub tuya_id: String,
    pub name: String,
    pub kind: DeviceKind,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] when:
    /// - `tuya_id` is empty ([`ValidationError::EmptyTuyaId`])
    /// - `name` is empty ([`ValidationError::EmptyName`])
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.tuya_id.is_empty() {
            return Err(ValidationError::EmptyTuyaId.into());
        }
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    tuya_id: Option<String>,
    name: Option<String>,
    kind: DeviceKind,
}

impl Default for DeviceBuilder {
    fn default() -> Self {
        Self {
            id: None,
            tuya_id: None,
            name: None,
            kind: DeviceKind::Fan,
        }
    }
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: DeviceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn tuya_id(mut self, tuya_id: impl Into<String>) -> Self {
        self.tuya_id = Some(tuya_id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: DeviceKind) -> Self {
        self.kind = kind;
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// A missing name falls back to the Tuya id.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] if `tuya_id` is missing or empty.
    pub fn build(self) -> Result<Device, BridgeError> {
        let tuya_id = self.tuya_id.unwrap_or_default();
        let device = Device {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_else(|| tuya_id.clone()),
            tuya_id,
            kind: self.kind,
        };
        device.validate()?;
        Ok(device)
    }
}
