//! # tuyabridge-app
//!
//! Application layer — device controllers and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `HubPort`: capability values and capability set on the hub
//!   - `TuyaTransport`: command batches to Tuya devices
//! - Define **device controllers** driving the domain translation:
//!   - `FanController`: status reduction, command dispatch, light write
//!     coalescing, light-support capability management
//!   - `ContactSensorController`: status reduction and alarm timeout
//! - Run each controller on its own task (`runtime`) and route inbound
//!   events by Tuya id (`bridge`)
//!
//! ## Dependency rule
//! Depends on `tuyabridge-domain` only (plus `tokio` for tasks and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod bridge;
pub mod debounce;
pub mod ports;
pub mod runtime;
pub mod services;

#[cfg(test)]
mod testing;
