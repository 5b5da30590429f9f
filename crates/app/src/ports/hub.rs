//! Hub port — the smart-home hub side of a bridged device.

use std::future::Future;

use tuyabridge_domain::capability::{CapabilityValue, HubCapability};
use tuyabridge_domain::error::BridgeError;
use tuyabridge_domain::id::DeviceId;

/// Capability state and capability set of hub devices.
///
/// Adapters report failures as [`BridgeError::Hub`].
pub trait HubPort: Send + Sync {
    /// Store a capability value on the hub device.
    fn set_capability_value(
        &self,
        device: DeviceId,
        capability: HubCapability,
        value: CapabilityValue,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Expose a new capability on the hub device.
    fn add_capability(
        &self,
        device: DeviceId,
        capability: HubCapability,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Stop exposing a capability on the hub device.
    fn remove_capability(
        &self,
        device: DeviceId,
        capability: HubCapability,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}
