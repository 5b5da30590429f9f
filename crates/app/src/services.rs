//! Device controllers — one per bridged device instance.
//!
//! Each controller accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete
//! adapters. Controllers are driven by a single task (see
//! [`runtime`](crate::runtime)) and never need locking.

pub mod contact_sensor_controller;
pub mod fan_controller;

use std::future::Future;

use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tuyabridge_domain::capability::{CapabilitySet, CapabilityState, CapabilityValue, HubCapability};
use tuyabridge_domain::device::Device;
use tuyabridge_domain::error::BridgeError;
use tuyabridge_domain::settings::SettingsChange;
use tuyabridge_domain::tuya::StatusUpdate;

pub use contact_sensor_controller::ContactSensorController;
pub use fan_controller::FanController;

/// Point-in-time view of a device for queries.
#[derive(Debug, Clone)]
pub struct DeviceSnapshot {
    pub device: Device,
    pub active: CapabilitySet,
    pub state: CapabilityState,
}

/// Behaviour shared by every device class.
pub trait DeviceController: Send + 'static {
    type Settings: DeserializeOwned + Send + 'static;

    fn device(&self) -> &Device;

    fn snapshot(&self) -> DeviceSnapshot;

    /// Apply a Tuya status push. Individual write failures are logged.
    fn on_tuya_status(&mut self, update: StatusUpdate) -> impl Future<Output = ()> + Send;

    /// Handle a hub-side write to one capability.
    fn on_capability_write(
        &mut self,
        capability: HubCapability,
        value: CapabilityValue,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// React to a settings change from the hub.
    fn on_settings_changed(
        &mut self,
        change: SettingsChange<Self::Settings>,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Next instant at which [`on_deadline`](Self::on_deadline) must run.
    fn next_deadline(&self) -> Option<Instant>;

    fn on_deadline(&mut self, now: Instant) -> impl Future<Output = ()> + Send;

    /// Called once when the device task stops.
    fn on_shutdown(&mut self) -> impl Future<Output = ()> + Send {
        async {}
    }
}

/// Reject writes to capabilities the device does not expose.
fn ensure_active(
    device: &Device,
    active: &CapabilitySet,
    capability: HubCapability,
) -> Result<(), BridgeError> {
    if active.contains(capability) {
        Ok(())
    } else {
        Err(tuyabridge_domain::error::NotFoundError {
            entity: "Capability",
            id: format!("{}/{capability}", device.tuya_id),
        }
        .into())
    }
}
