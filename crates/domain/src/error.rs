//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`BridgeError`]
//! via `#[from]` or an explicit `into_domain()`.

use crate::capability::HubCapability;

/// Boxed source error coming from an outer layer (transport, hub framework).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error returned across port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The Tuya transport rejected or failed to deliver a command batch.
    #[error("transport error")]
    Transport(#[source] BoxError),

    /// The hub framework failed to apply a capability change.
    #[error("hub error")]
    Hub(#[source] BoxError),

    /// The per-device task is no longer running.
    #[error("device task stopped")]
    Stopped,
}

/// Invariant violations detected in domain objects or inbound values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("tuya id must not be empty")]
    EmptyTuyaId,

    #[error("name must not be empty")]
    EmptyName,

    #[error("unknown capability {0:?}")]
    UnknownCapability(String),

    #[error("capability {0} is not writable")]
    NotWritable(HubCapability),

    #[error("capability {capability} expects a {expected} value")]
    InvalidValue {
        capability: HubCapability,
        expected: &'static str,
    },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// A lookup that found nothing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
