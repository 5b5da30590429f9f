//! Per-device runtime — one tokio task owning one controller.
//!
//! All inbound events for a device go through a bounded channel and are
//! handled in order by the task, which also sleeps until the controller's
//! next deadline. The controller's state is therefore never shared.

use std::future;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tuyabridge_domain::capability::{CapabilityValue, HubCapability};
use tuyabridge_domain::device::Device;
use tuyabridge_domain::error::BridgeError;
use tuyabridge_domain::settings::SettingsChange;
use tuyabridge_domain::tuya::StatusUpdate;

use crate::services::{DeviceController, DeviceSnapshot};

type Reply<T> = oneshot::Sender<T>;

/// An inbound event for one device.
#[derive(Debug)]
pub enum DeviceEvent<S> {
    TuyaStatus(StatusUpdate),
    CapabilityWrite {
        capability: HubCapability,
        value: CapabilityValue,
        reply: Reply<Result<(), BridgeError>>,
    },
    SettingsChanged {
        change: SettingsChange<S>,
        reply: Reply<Result<(), BridgeError>>,
    },
    Snapshot {
        reply: Reply<DeviceSnapshot>,
    },
}

/// Cloneable sender side of a device task.
#[derive(Debug)]
pub struct DeviceHandle<S> {
    device: Device,
    sender: mpsc::Sender<DeviceEvent<S>>,
}

impl<S> Clone for DeviceHandle<S> {
    fn clone(&self) -> Self {
        Self {
            device: self.device.clone(),
            sender: self.sender.clone(),
        }
    }
}

impl<S: Send + 'static> DeviceHandle<S> {
    #[must_use]
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Queue a status push. Returns once the event is queued.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Stopped`] when the device task has ended.
    pub async fn push_status(&self, update: StatusUpdate) -> Result<(), BridgeError> {
        self.send(DeviceEvent::TuyaStatus(update)).await
    }

    /// Apply a hub write and wait for its outcome.
    ///
    /// # Errors
    ///
    /// Returns the controller's error, or [`BridgeError::Stopped`].
    pub async fn write(
        &self,
        capability: HubCapability,
        value: CapabilityValue,
    ) -> Result<(), BridgeError> {
        let (reply, rx) = oneshot::channel();
        self.send(DeviceEvent::CapabilityWrite {
            capability,
            value,
            reply,
        })
        .await?;
        rx.await.map_err(|_| BridgeError::Stopped)?
    }

    /// Apply a settings change and wait for its outcome.
    ///
    /// # Errors
    ///
    /// Returns the controller's error, or [`BridgeError::Stopped`].
    pub async fn change_settings(&self, change: SettingsChange<S>) -> Result<(), BridgeError> {
        let (reply, rx) = oneshot::channel();
        self.send(DeviceEvent::SettingsChanged { change, reply })
            .await?;
        rx.await.map_err(|_| BridgeError::Stopped)?
    }

    /// Current capability set and values.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Stopped`] when the device task has ended.
    pub async fn snapshot(&self) -> Result<DeviceSnapshot, BridgeError> {
        let (reply, rx) = oneshot::channel();
        self.send(DeviceEvent::Snapshot { reply }).await?;
        rx.await.map_err(|_| BridgeError::Stopped)
    }

    async fn send(&self, event: DeviceEvent<S>) -> Result<(), BridgeError> {
        self.sender
            .send(event)
            .await
            .map_err(|_| BridgeError::Stopped)
    }
}

/// Spawn the task driving `controller`.
///
/// The task stops once every [`DeviceHandle`] is dropped, after giving the
/// controller a chance to flush.
pub fn spawn<C: DeviceController>(
    controller: C,
    capacity: usize,
) -> (DeviceHandle<C::Settings>, JoinHandle<()>) {
    let (sender, receiver) = mpsc::channel(capacity);
    let handle = DeviceHandle {
        device: controller.device().clone(),
        sender,
    };
    let task = tokio::spawn(run(controller, receiver));
    (handle, task)
}

async fn run<C: DeviceController>(
    mut controller: C,
    mut receiver: mpsc::Receiver<DeviceEvent<C::Settings>>,
) {
    tracing::debug!(device = %controller.device().tuya_id, "device task started");
    loop {
        let deadline = controller.next_deadline();
        tokio::select! {
            event = receiver.recv() => match event {
                Some(event) => handle(&mut controller, event).await,
                None => break,
            },
            () = wait_until(deadline) => controller.on_deadline(Instant::now()).await,
        }
    }
    controller.on_shutdown().await;
    tracing::debug!(device = %controller.device().tuya_id, "device task stopped");
}

async fn handle<C: DeviceController>(controller: &mut C, event: DeviceEvent<C::Settings>) {
    match event {
        DeviceEvent::TuyaStatus(update) => controller.on_tuya_status(update).await,
        DeviceEvent::CapabilityWrite {
            capability,
            value,
            reply,
        } => {
            let result = controller.on_capability_write(capability, value).await;
            // The caller may have given up waiting.
            let _ = reply.send(result);
        }
        DeviceEvent::SettingsChanged { change, reply } => {
            let result = controller.on_settings_changed(change).await;
            let _ = reply.send(result);
        }
        DeviceEvent::Snapshot { reply } => {
            let _ = reply.send(controller.snapshot());
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => future::pending().await,
    }
}
