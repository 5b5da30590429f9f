//! Fan controller — status reduction, command dispatch, light write
//! coalescing and light-support capability management for one fan.

use std::time::Duration;

use tokio::time::Instant;
use tuyabridge_domain::capability::{
    CapabilitySet, CapabilityState, CapabilityValue, CapabilityWrite, HubCapability,
};
use tuyabridge_domain::device::Device;
use tuyabridge_domain::error::BridgeError;
use tuyabridge_domain::fan::{
    CapabilityChange, FanProfile, LightWrite, compose_command, compose_light_commands,
    plan_light_support, reduce_status,
};
use tuyabridge_domain::settings::{FanSettings, SettingsChange};
use tuyabridge_domain::tuya::{CommandBatch, StatusUpdate};

use super::{DeviceController, DeviceSnapshot, ensure_active};
use crate::debounce::Debouncer;
use crate::ports::{HubPort, TuyaTransport};

/// Drives one fan instance.
pub struct FanController<H, T> {
    device: Device,
    profile: FanProfile,
    settings: FanSettings,
    active: CapabilitySet,
    state: CapabilityState,
    pending: Debouncer<LightWrite>,
    hub: H,
    transport: T,
}

impl<H: HubPort, T: TuyaTransport> FanController<H, T> {
    /// Create a controller for a fan whose hub device currently exposes
    /// `active`. Light-group writes are coalesced over `light_debounce`.
    pub fn new(
        device: Device,
        profile: FanProfile,
        settings: FanSettings,
        active: CapabilitySet,
        hub: H,
        transport: T,
        light_debounce: Duration,
    ) -> Self {
        Self {
            device,
            profile,
            settings,
            active,
            state: CapabilityState::default(),
            pending: Debouncer::new(light_debounce),
            hub,
            transport,
        }
    }

    #[must_use]
    pub fn profile(&self) -> &FanProfile {
        &self.profile
    }

    #[must_use]
    pub fn settings(&self) -> &FanSettings {
        &self.settings
    }

    #[must_use]
    pub fn active(&self) -> &CapabilitySet {
        &self.active
    }

    #[must_use]
    pub fn state(&self) -> &CapabilityState {
        &self.state
    }

    /// Buffer a light-group write; the batch is sent once no new field has
    /// arrived for the debounce window.
    pub fn on_light_write(&mut self, write: LightWrite, now: Instant) {
        for field in write.fields() {
            self.state.set(field.capability, field.value);
        }
        self.pending.push_with(now, |pending| pending.merge(write));
    }

    /// Send the pending light write, if any, without waiting for its deadline.
    pub async fn flush_light(&mut self) {
        if let Some(write) = self.pending.take() {
            self.send_light(write).await;
        }
    }

    async fn send_light(&mut self, write: LightWrite) {
        let batch = compose_light_commands(&self.profile, &self.active, &self.state, &write);
        if batch.is_empty() {
            tracing::debug!(device = %self.device.tuya_id, "light write produced no command");
            return;
        }
        // Failure is already logged and there is no caller to report to.
        let _ = self.send(batch).await;
    }

    async fn send(&self, batch: CommandBatch) -> Result<(), BridgeError> {
        let count = batch.len();
        self.transport
            .send_commands(&self.device.tuya_id, batch)
            .await
            .inspect(|()| tracing::debug!(device = %self.device.tuya_id, count, "commands sent"))
            .inspect_err(|err| {
                tracing::warn!(%err, device = %self.device.tuya_id, count, "failed to send commands");
            })
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

    async fn apply(&mut self, change: CapabilityChange) -> Result<(), BridgeError> {
        match change {
            CapabilityChange::Add(capability) => {
                self.hub.add_capability(self.device.id, capability).await?;
            }
            CapabilityChange::Remove(capability) => {
                self.hub.remove_capability(self.device.id, capability).await?;
                self.state.remove(capability);
            }
        }
        change.apply(&mut self.active);
        tracing::info!(device = %self.device.tuya_id, ?change, "capability set updated");
        Ok(())
    }
}

impl<H, T> DeviceController for FanController<H, T>
where
    H: HubPort + 'static,
    T: TuyaTransport + 'static,
{
    type Settings = FanSettings;

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
        let writes = reduce_status(&self.profile, &self.active, &update.status);
        for write in writes {
            self.set_value(write).await;
        }
    }

    #[tracing::instrument(skip(self, value), fields(device = %self.device.tuya_id))]
    async fn on_capability_write(
        &mut self,
        capability: HubCapability,
        value: CapabilityValue,
    ) -> Result<(), BridgeError> {
        ensure_active(&self.device, &self.active, capability)?;

        if capability.is_light_group() {
            let mut write = LightWrite::default();
            write.set(capability, &value)?;
            self.on_light_write(write, Instant::now());
            return Ok(());
        }

        let batch = compose_command(&self.profile, capability, &value)?;
        self.send(batch).await?;
        self.state.set(capability, value);
        Ok(())
    }

    #[tracing::instrument(skip(self, change), fields(device = %self.device.tuya_id))]
    async fn on_settings_changed(
        &mut self,
        change: SettingsChange<FanSettings>,
    ) -> Result<(), BridgeError> {
        if change.has_changed(FanSettings::ENABLE_LIGHT_SUPPORT) {
            let enabled = change.new_settings.enable_light_support;
            for step in plan_light_support(enabled, &self.profile, &self.active) {
                self.apply(step).await?;
            }
            if !enabled {
                self.pending.cancel();
            }
        }
        self.settings = change.new_settings;
        Ok(())
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.pending.deadline()
    }

    async fn on_deadline(&mut self, now: Instant) {
        if let Some(write) = self.pending.take_due(now) {
            self.send_light(write).await;
        }
    }

    async fn on_shutdown(&mut self) {
        self.flush_light().await;
    }
}
