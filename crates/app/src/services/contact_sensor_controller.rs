//! Contact sensor controller.

use std::time::Duration;

use tokio::time::Instant;
use tuyabridge_domain::capability::{
    CapabilitySet, CapabilityState, CapabilityValue, CapabilityWrite, HubCapability,
};
use tuyabridge_domain::contact::{raises_contact_alarm, reduce_status};
use tuyabridge_domain::device::Device;
use tuyabridge_domain::error::{BridgeError, ValidationError};
use tuyabridge_domain::mapping::CapabilityMap;
use tuyabridge_domain::settings::{ContactSensorSettings, SettingsChange};
use tuyabridge_domain::tuya::StatusUpdate;

use super::{DeviceController, DeviceSnapshot, ensure_active};
use crate::ports::HubPort;

/// Drives one contact sensor. Read-only: every capability write is refused.
pub struct ContactSensorController<H> {
    device: Device,
    map: CapabilityMap,
    settings: ContactSensorSettings,
    active: CapabilitySet,
    state: CapabilityState,
    alarm_reset: Option<Instant>,
    hub: H,
}

impl<H: HubPort> ContactSensorController<H> {
    pub fn new(
        device: Device,
        settings: ContactSensorSettings,
        active: CapabilitySet,
        hub: H,
    ) -> Self {
        Self {
            device,
            map: CapabilityMap::contact_sensor(),
            settings,
            active,
            state: CapabilityState::default(),
            alarm_reset: None,
            hub,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &ContactSensorSettings {
        &self.settings
    }

    #[must_use]
    pub fn state(&self) -> &CapabilityState {
        &self.state
    }

    async fn set_value(&mut self, write: CapabilityWrite) {
        let CapabilityWrite { capability, value } = write;
        match self
            .hub
            .set_capability_value(self.device.id, capability, value.clone())
            .await
        {
            Ok(()) => self.state.set(capability, value),
            Err(err) => tracing::warn!(
                %err,
                device = %self.device.tuya_id,
                %capability,
                "failed to set capability value"
            ),
        }
    }
}

impl<H: HubPort + 'static> DeviceController for ContactSensorController<H> {
    type Settings = ContactSensorSettings;

    fn device(&self) -> &Device {
        &self.device
    }

    fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            device: self.device.clone(),
            active: self.active.clone(),
            state: self.state.clone(),
        }
    }

    #[tracing::instrument(skip(self, update), fields(device = %self.device.tuya_id, changed = update.changed.len()))]
    async fn on_tuya_status(&mut self, update: StatusUpdate) {
        let writes = reduce_status(&self.map, &self.active, &self.settings, &update);
        if self.settings.use_alarm_timeout && raises_contact_alarm(&writes) {
            let timeout = Duration::from_secs(self.settings.alarm_timeout);
            match Instant::now().checked_add(timeout) {
                Some(reset) => {
                    self.alarm_reset = Some(reset);
                    tracing::debug!(
                        timeout_secs = self.settings.alarm_timeout,
                        "contact alarm reset armed"
                    );
                }
                None => tracing::warn!(
                    timeout_secs = self.settings.alarm_timeout,
                    "alarm timeout out of range, contact alarm will not reset"
                ),
            }
        }
        for write in writes {
            self.set_value(write).await;
        }
    }

    async fn on_capability_write(
        &mut self,
        capability: HubCapability,
        _value: CapabilityValue,
    ) -> Result<(), BridgeError> {
        ensure_active(&self.device, &self.active, capability)?;
        Err(ValidationError::NotWritable(capability).into())
    }

    async fn on_settings_changed(
        &mut self,
        change: SettingsChange<ContactSensorSettings>,
    ) -> Result<(), BridgeError> {
        if change.has_changed(ContactSensorSettings::USE_ALARM_TIMEOUT)
            && !change.new_settings.use_alarm_timeout
            && self.alarm_reset.take().is_some()
        {
            tracing::debug!(device = %self.device.tuya_id, "pending contact alarm reset cancelled");
        }
        self.settings = change.new_settings;
        Ok(())
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.alarm_reset
    }

    async fn on_deadline(&mut self, now: Instant) {
        if self.alarm_reset.is_some_and(|reset| reset <= now) {
            self.alarm_reset = None;
            self.set_value(CapabilityWrite::new(HubCapability::AlarmContact, false))
                .await;
        }
    }
}
