//! Command payload encoding: `{"commands": [{"code", "value"}]}`.

use serde::Serialize;
use tuyabridge_domain::tuya::CommandBatch;

use crate::error::TuyaCodecError;

#[derive(Serialize)]
struct CommandPayload<'a> {
    commands: &'a CommandBatch,
}

/// Encode a batch as the body of a Tuya command request.
///
/// # Errors
///
/// Returns [`TuyaCodecError::InvalidPayload`] when serialization fails.
pub fn encode_commands(batch: &CommandBatch) -> Result<String, TuyaCodecError> {
    serde_json::to_string(&CommandPayload { commands: batch })
        .map_err(TuyaCodecError::InvalidPayload)
}
