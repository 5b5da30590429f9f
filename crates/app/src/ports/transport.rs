//! Transport port — delivery of command batches to Tuya devices.

use std::future::Future;

use tuyabridge_domain::error::BridgeError;
use tuyabridge_domain::tuya::CommandBatch;

/// Sends commands to the Tuya cloud (or a local gateway).
pub trait TuyaTransport: Send + Sync {
    /// Send one batch to the device identified by its Tuya id.
    ///
    /// The batch is never empty. Adapters report failures as
    /// [`BridgeError::Transport`].
    fn send_commands(
        &self,
        tuya_id: &str,
        batch: CommandBatch,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}
