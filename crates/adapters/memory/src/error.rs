//! In-memory adapter error types.

use tuyabridge_domain::capability::HubCapability;
use tuyabridge_domain::error::BridgeError;
use tuyabridge_domain::id::DeviceId;

/// Errors raised by the in-memory hub and transport.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("device {0} is not registered on the hub")]
    UnknownDevice(DeviceId),

    #[error("device {device} has no capability {capability}")]
    MissingCapability {
        device: DeviceId,
        capability: HubCapability,
    },

    /// Failure injected through `reject`.
    #[error("capability {0} rejected")]
    Rejected(HubCapability),

    #[error("transport offline")]
    Offline,
}

impl MemoryError {
    /// Convert into the [`BridgeError`] variant of the failing side.
    #[must_use]
    pub fn into_domain(self) -> BridgeError {
        match self {
            Self::Offline => BridgeError::Transport(Box::new(self)),
            other => BridgeError::Hub(Box::new(other)),
        }
    }
}

impl From<MemoryError> for BridgeError {
    fn from(err: MemoryError) -> Self {
        err.into_domain()
    }
}
