//! # tuyabridge-domain
//!
//! Pure domain model for translating between hub capabilities and the Tuya
//! status / command protocol.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **hub capabilities** (closed set of tags, values, per-device state)
//! - Define **Tuya values** (status snapshots, composite colour, command batches)
//! - Define **calibration** (vendor ranges ↔ normalized 0..1 values)
//! - Define the **capability mapping** between Tuya codes and hub capabilities
//! - Contain the translation logic for fans and contact sensors
//!   (status reduction, command composition, light-support planning)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod calibration;
pub mod capability;
pub mod contact;
pub mod device;
pub mod fan;
pub mod mapping;
pub mod settings;
pub mod tuya;
