//! Daemon — builds the bridge from configuration and dispatches the event
//! stream to it.

use std::collections::HashMap;
use std::time::Duration;

use tuyabridge_adapter_memory::{InMemoryHub, LoggingTransport};
use tuyabridge_adapter_tuya::{DeviceSpecification, StatusReport, StatusTracker, TuyaCodecError};
use tuyabridge_app::bridge::Bridge;
use tuyabridge_app::services::{ContactSensorController, FanController};
use tuyabridge_domain::capability::{CapabilitySet, HubCapability};
use tuyabridge_domain::device::{Device, DeviceKind};
use tuyabridge_domain::error::{BridgeError, ValidationError};
use tuyabridge_domain::fan::{FanProfile, plan_light_support};
use tuyabridge_domain::mapping::FanCategory;
use tuyabridge_domain::settings::{ContactSensorSettings, FanSettings};

use crate::config::{Config, DeviceConfig};
use crate::events::{InboundEvent, Response};

const SENSOR_CAPABILITIES: [HubCapability; 4] = [
    HubCapability::AlarmContact,
    HubCapability::MeasureBattery,
    HubCapability::AlarmBattery,
    HubCapability::AlarmTamper,
];

/// Errors raised while provisioning devices.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("failed to read specification {path}")]
    Specification {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Codec(#[from] TuyaCodecError),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Running bridge plus the per-device Tuya snapshots.
pub struct Daemon {
    bridge: Bridge,
    trackers: HashMap<String, StatusTracker>,
    hub: InMemoryHub,
    transport: LoggingTransport,
}

impl Daemon {
    /// Provision and spawn every configured device.
    ///
    /// # Errors
    ///
    /// Returns [`DaemonError`] when a device entry, its settings or its
    /// specification file is invalid.
    pub fn build(
        config: &Config,
        hub: InMemoryHub,
        transport: LoggingTransport,
    ) -> Result<Self, DaemonError> {
        let mut daemon = Self {
            bridge: Bridge::new(),
            trackers: HashMap::new(),
            hub,
            transport,
        };
        for entry in &config.devices {
            daemon.provision(entry, config.light_debounce(), config.runtime.channel_capacity)?;
        }
        tracing::info!(count = daemon.bridge.len(), "devices provisioned");
        Ok(daemon)
    }

    fn provision(
        &mut self,
        entry: &DeviceConfig,
        light_debounce: Duration,
        capacity: usize,
    ) -> Result<(), DaemonError> {
        let mut builder = Device::builder().tuya_id(&entry.tuya_id).kind(entry.kind);
        if let Some(name) = &entry.name {
            builder = builder.name(name);
        }
        let device = builder.build()?;

        match entry.kind {
            DeviceKind::Fan => {
                let profile = fan_profile(entry)?;
                let settings: FanSettings = initial_settings(entry)?;
                let mut active: CapabilitySet = if entry.capabilities.is_empty() {
                    [HubCapability::Onoff, profile.category.fan_speed_capability()]
                        .into_iter()
                        .collect()
                } else {
                    entry.capabilities.iter().copied().collect()
                };
                for change in plan_light_support(settings.enable_light_support, &profile, &active)
                {
                    change.apply(&mut active);
                }
                self.hub.register(device.id, active.clone());
                let controller = FanController::new(
                    device,
                    profile,
                    settings,
                    active,
                    self.hub.clone(),
                    self.transport.clone(),
                    light_debounce,
                );
                self.bridge.spawn_fan(controller, capacity);
            }
            DeviceKind::ContactSensor => {
                let settings: ContactSensorSettings = initial_settings(entry)?;
                let active: CapabilitySet = if entry.capabilities.is_empty() {
                    SENSOR_CAPABILITIES.into_iter().collect()
                } else {
                    entry.capabilities.iter().copied().collect()
                };
                self.hub.register(device.id, active.clone());
                let controller =
                    ContactSensorController::new(device, settings, active, self.hub.clone());
                self.bridge.spawn_contact_sensor(controller, capacity);
            }
        }
        self.trackers
            .insert(entry.tuya_id.clone(), StatusTracker::new());
        Ok(())
    }

    #[must_use]
    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    /// Decode one event line, dispatch it and render the response.
    pub async fn handle_line(&mut self, line: &str) -> Response {
        let event: InboundEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(%err, "dropping malformed event");
                return Response::error(None, &err);
            }
        };
        let device = event.device().to_string();
        match self.dispatch(event).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(%err, device = %device, "event failed");
                Response::error(Some(device), &err)
            }
        }
    }

    #[tracing::instrument(skip(self, event), fields(device = %event.device()))]
    async fn dispatch(&mut self, event: InboundEvent) -> Result<Response, DaemonError> {
        match event {
            InboundEvent::Status(report) => {
                self.push_report(&report).await?;
                Ok(Response::Ok {
                    device: report.dev_id,
                })
            }
            InboundEvent::Write {
                device,
                capability,
                value,
            } => {
                self.bridge.write(&device, capability, value).await?;
                Ok(Response::Ok { device })
            }
            InboundEvent::Settings {
                device,
                changed_keys,
                settings,
            } => {
                self.bridge
                    .change_settings(&device, changed_keys, settings)
                    .await?;
                Ok(Response::Ok { device })
            }
            InboundEvent::Snapshot { device } => {
                let snapshot = self.bridge.snapshot(&device).await?;
                let last_report = self
                    .trackers
                    .get(&device)
                    .and_then(StatusTracker::last_report);
                Ok(Response::snapshot(&snapshot, last_report))
            }
        }
    }

    async fn push_report(&mut self, report: &StatusReport) -> Result<(), DaemonError> {
        // Unknown devices are rejected before their report is tracked.
        self.bridge.get(&report.dev_id)?;
        let status = report.to_status();
        let reported_at = report.reported_at();
        let tracker = self.trackers.entry(report.dev_id.clone()).or_default();
        let update = tracker.apply(status, reported_at);
        tracing::debug!(changed = update.changed.len(), "status tracked");
        self.bridge.push_status(&report.dev_id, update).await?;
        Ok(())
    }

    /// Stop every device task once pending work is flushed.
    pub async fn shutdown(self) {
        self.bridge.shutdown().await;
    }
}

fn fan_profile(entry: &DeviceConfig) -> Result<FanProfile, DaemonError> {
    if let Some(path) = &entry.specification {
        let payload =
            std::fs::read_to_string(path).map_err(|source| DaemonError::Specification {
                path: path.display().to_string(),
                source,
            })?;
        let spec = DeviceSpecification::parse(&payload)?.to_fan()?;
        return Ok(FanProfile::new(spec.category, spec.tuya, spec.calibration));
    }
    let category = entry
        .category
        .as_deref()
        .map_or_else(FanCategory::default, FanCategory::from_tag);
    let tuya = entry.tuya_capabilities.iter().map(String::as_str).collect();
    Ok(FanProfile::new(category, tuya, entry.calibration))
}

fn initial_settings<S: serde::de::DeserializeOwned>(
    entry: &DeviceConfig,
) -> Result<S, DaemonError> {
    serde_json::from_value(entry.settings.clone()).map_err(|err| {
        DaemonError::Bridge(ValidationError::InvalidSettings(err.to_string()).into())
    })
}
