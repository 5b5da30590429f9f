//! # tuyabridge-adapter-tuya
//!
//! Tuya adapter — the JSON wire formats of the Tuya cloud.
//!
//! ## Responsibilities
//! - Decode status reports, including stringified `colour_data`
//! - Merge reports into per-device snapshots and compute changed codes
//! - Encode command batches as request bodies
//! - Decode device specifications into Tuya codes and fan calibration
//!
//! ## Dependency rule
//! Depends on `tuyabridge-domain` only. The daemon feeds decoded reports to
//! the app layer and hands encoded commands to its transport.

pub mod command;
pub mod error;
pub mod report;
pub mod specification;
pub mod tracker;

pub use command::encode_commands;
pub use error::TuyaCodecError;
pub use report::StatusReport;
pub use specification::{DeviceSpecification, FanSpecification};
pub use tracker::StatusTracker;
