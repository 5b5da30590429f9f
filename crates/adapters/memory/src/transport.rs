//! Logging [`TuyaTransport`] implementation.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tuyabridge_app::ports::TuyaTransport;
use tuyabridge_domain::error::BridgeError;
use tuyabridge_domain::tuya::CommandBatch;

use crate::error::MemoryError;

/// A batch delivered to a device.
#[derive(Debug, Clone, PartialEq)]
pub struct SentBatch {
    pub tuya_id: String,
    pub batch: CommandBatch,
}

/// Logs and records every batch instead of contacting the Tuya cloud.
#[derive(Debug, Clone, Default)]
pub struct LoggingTransport {
    sent: Arc<Mutex<Vec<SentBatch>>>,
    offline: Arc<AtomicBool>,
}

impl LoggingTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every later send while `offline` is set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    /// Every batch sent so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<SentBatch> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TuyaTransport for LoggingTransport {
    fn send_commands(
        &self,
        tuya_id: &str,
        batch: CommandBatch,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let result: Result<(), BridgeError> = if self.offline.load(Ordering::Relaxed) {
            Err(MemoryError::Offline.into())
        } else {
            match serde_json::to_string(&batch) {
                Ok(commands) => tracing::info!(device = %tuya_id, %commands, "sending commands"),
                Err(err) => tracing::warn!(%err, device = %tuya_id, "failed to encode commands for logging"),
            }
            self.sent
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(SentBatch {
                    tuya_id: tuya_id.to_string(),
                    batch,
                });
            Ok(())
        };
        async { result }
    }
}
