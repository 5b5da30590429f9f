//! Bridge — routes inbound events to device tasks by Tuya id.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tuyabridge_domain::capability::{CapabilityValue, HubCapability};
use tuyabridge_domain::device::{Device, DeviceKind};
use tuyabridge_domain::error::{BridgeError, NotFoundError, ValidationError};
use tuyabridge_domain::settings::{ContactSensorSettings, FanSettings, SettingsChange};
use tuyabridge_domain::tuya::StatusUpdate;

use crate::runtime::{self, DeviceHandle};
use crate::services::{DeviceController, DeviceSnapshot};

/// Handle to a running device of either class.
#[derive(Debug, Clone)]
pub enum DeviceRuntime {
    Fan(DeviceHandle<FanSettings>),
    ContactSensor(DeviceHandle<ContactSensorSettings>),
}

impl DeviceRuntime {
    #[must_use]
    pub fn device(&self) -> &Device {
        match self {
            Self::Fan(handle) => handle.device(),
            Self::ContactSensor(handle) => handle.device(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::Fan(_) => DeviceKind::Fan,
            Self::ContactSensor(_) => DeviceKind::ContactSensor,
        }
    }
}

/// Registry of running device tasks.
#[derive(Default)]
pub struct Bridge {
    devices: HashMap<String, DeviceRuntime>,
    tasks: Vec<JoinHandle<()>>,
}

impl Bridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a fan controller and register it under its Tuya id.
    pub fn spawn_fan<C>(&mut self, controller: C, capacity: usize)
    where
        C: DeviceController<Settings = FanSettings>,
    {
        let (handle, task) = runtime::spawn(controller, capacity);
        self.register(DeviceRuntime::Fan(handle), task);
    }

    /// Spawn a contact sensor controller and register it under its Tuya id.
    pub fn spawn_contact_sensor<C>(&mut self, controller: C, capacity: usize)
    where
        C: DeviceController<Settings = ContactSensorSettings>,
    {
        let (handle, task) = runtime::spawn(controller, capacity);
        self.register(DeviceRuntime::ContactSensor(handle), task);
    }

    fn register(&mut self, runtime: DeviceRuntime, task: JoinHandle<()>) {
        let tuya_id = runtime.device().tuya_id.clone();
        tracing::info!(device = %tuya_id, kind = ?runtime.kind(), "device registered");
        if let Some(previous) = self.devices.insert(tuya_id.clone(), runtime) {
            tracing::warn!(device = %tuya_id, kind = ?previous.kind(), "replaced running device");
        }
        self.tasks.push(task);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Look up a device by Tuya id.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] for unknown ids.
    pub fn get(&self, tuya_id: &str) -> Result<&DeviceRuntime, BridgeError> {
        self.devices.get(tuya_id).ok_or_else(|| {
            NotFoundError {
                entity: "Device",
                id: tuya_id.to_string(),
            }
            .into()
        })
    }

    /// Route a status push.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] for unknown ids, or
    /// [`BridgeError::Stopped`].
    pub async fn push_status(&self, tuya_id: &str, update: StatusUpdate) -> Result<(), BridgeError> {
        match self.get(tuya_id)? {
            DeviceRuntime::Fan(handle) => handle.push_status(update).await,
            DeviceRuntime::ContactSensor(handle) => handle.push_status(update).await,
        }
    }

    /// Route a hub write and wait for its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] for unknown ids, or the
    /// controller's error.
    pub async fn write(
        &self,
        tuya_id: &str,
        capability: HubCapability,
        value: CapabilityValue,
    ) -> Result<(), BridgeError> {
        match self.get(tuya_id)? {
            DeviceRuntime::Fan(handle) => handle.write(capability, value).await,
            DeviceRuntime::ContactSensor(handle) => handle.write(capability, value).await,
        }
    }

    /// Route a settings change given as a JSON object of the full new
    /// settings; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSettings`] when the object does not
    /// match the device class, [`BridgeError::NotFound`] for unknown ids,
    /// or the controller's error.
    pub async fn change_settings(
        &self,
        tuya_id: &str,
        changed_keys: Vec<String>,
        new_settings: serde_json::Value,
    ) -> Result<(), BridgeError> {
        match self.get(tuya_id)? {
            DeviceRuntime::Fan(handle) => {
                let change = parse_settings(changed_keys, new_settings)?;
                handle.change_settings(change).await
            }
            DeviceRuntime::ContactSensor(handle) => {
                let change = parse_settings(changed_keys, new_settings)?;
                handle.change_settings(change).await
            }
        }
    }

    /// Current capability set and values of a device.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] for unknown ids, or
    /// [`BridgeError::Stopped`].
    pub async fn snapshot(&self, tuya_id: &str) -> Result<DeviceSnapshot, BridgeError> {
        match self.get(tuya_id)? {
            DeviceRuntime::Fan(handle) => handle.snapshot().await,
            DeviceRuntime::ContactSensor(handle) => handle.snapshot().await,
        }
    }

    /// Drop every handle and wait for the device tasks to flush and stop.
    pub async fn shutdown(self) {
        let Self { devices, tasks } = self;
        drop(devices);
        for task in tasks {
            if let Err(err) = task.await {
                tracing::warn!(%err, "device task ended abnormally");
            }
        }
        tracing::info!("bridge stopped");
    }
}

fn parse_settings<S: DeserializeOwned>(
    changed_keys: Vec<String>,
    new_settings: serde_json::Value,
) -> Result<SettingsChange<S>, ValidationError> {
    let settings = serde_json::from_value(new_settings)
        .map_err(|err| ValidationError::InvalidSettings(err.to_string()))?;
    Ok(SettingsChange::new(changed_keys, settings))
}
