//! # tuyabridge-adapter-memory
//!
//! In-memory adapter — stands in for the hub framework and the Tuya cloud
//! when the daemon runs locally, and in end-to-end tests.
//!
//! ## Provided ports
//!
//! | Port | Type | Behaviour |
//! |------|------|-----------|
//! | `HubPort` | [`InMemoryHub`] | Stores capability sets and values per device |
//! | `TuyaTransport` | [`LoggingTransport`] | Logs and records command batches |
//!
//! ## Dependency rule
//!
//! Depends on `tuyabridge-app` (port traits) and `tuyabridge-domain` only.

pub mod error;
pub mod hub;
pub mod transport;

pub use error::MemoryError;
pub use hub::InMemoryHub;
pub use transport::{LoggingTransport, SentBatch};
