//! In-memory [`HubPort`] implementation.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tuyabridge_app::ports::HubPort;
use tuyabridge_domain::capability::{CapabilitySet, CapabilityState, CapabilityValue, HubCapability};
use tuyabridge_domain::error::BridgeError;
use tuyabridge_domain::id::DeviceId;

use crate::error::MemoryError;

#[derive(Debug, Default)]
struct HubDevice {
    capabilities: CapabilitySet,
    values: CapabilityState,
}

#[derive(Debug, Default)]
struct Inner {
    devices: HashMap<DeviceId, HubDevice>,
    rejected: Vec<HubCapability>,
}

/// Hub devices held in memory, shared between clones.
///
/// Setting a value on a capability the device does not expose fails, like
/// it does on a real hub.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHub {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device with its initial capability set.
    pub fn register(&self, device: DeviceId, capabilities: CapabilitySet) {
        self.lock().devices.insert(
            device,
            HubDevice {
                capabilities,
                values: CapabilityState::default(),
            },
        );
    }

    /// Make every later operation on `capability` fail.
    pub fn reject(&self, capability: HubCapability) {
        self.lock().rejected.push(capability);
    }

    #[must_use]
    pub fn capabilities(&self, device: DeviceId) -> Option<CapabilitySet> {
        self.lock()
            .devices
            .get(&device)
            .map(|dev| dev.capabilities.clone())
    }

    #[must_use]
    pub fn value(&self, device: DeviceId, capability: HubCapability) -> Option<CapabilityValue> {
        self.lock()
            .devices
            .get(&device)
            .and_then(|dev| dev.values.get(capability).cloned())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_device(
        &self,
        device: DeviceId,
        capability: HubCapability,
        update: impl FnOnce(&mut HubDevice) -> Result<(), MemoryError>,
    ) -> Result<(), BridgeError> {
        let mut inner = self.lock();
        if inner.rejected.contains(&capability) {
            return Err(MemoryError::Rejected(capability).into());
        }
        let dev = inner
            .devices
            .get_mut(&device)
            .ok_or(MemoryError::UnknownDevice(device))?;
        update(dev).map_err(MemoryError::into_domain)
    }
}

impl HubPort for InMemoryHub {
    fn set_capability_value(
        &self,
        device: DeviceId,
        capability: HubCapability,
        value: CapabilityValue,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let result = self.with_device(device, capability, |dev| {
            if !dev.capabilities.contains(capability) {
                return Err(MemoryError::MissingCapability { device, capability });
            }
            tracing::debug!(%device, %capability, ?value, "capability value set");
            dev.values.set(capability, value);
            Ok(())
        });
        async { result }
    }

    fn add_capability(
        &self,
        device: DeviceId,
        capability: HubCapability,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let result = self.with_device(device, capability, |dev| {
            dev.capabilities.insert(capability);
            tracing::debug!(%device, %capability, "capability added");
            Ok(())
        });
        async { result }
    }

    fn remove_capability(
        &self,
        device: DeviceId,
        capability: HubCapability,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let result = self.with_device(device, capability, |dev| {
            dev.capabilities.remove(capability);
            dev.values.remove(capability);
            tracing::debug!(%device, %capability, "capability removed");
            Ok(())
        });
        async { result }
    }
}
