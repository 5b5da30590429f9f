//! Tuya codec error types.

use tuyabridge_domain::error::BridgeError;

/// Errors raised while decoding or encoding Tuya payloads.
#[derive(Debug, thiserror::Error)]
pub enum TuyaCodecError {
    /// The payload is not valid JSON or does not have the expected shape.
    #[error("invalid Tuya payload")]
    InvalidPayload(#[source] serde_json::Error),

    /// A `colour_data` string could not be parsed into `{h, s, v}`.
    #[error("invalid colour data for {code}")]
    InvalidColour {
        code: String,
        #[source]
        source: serde_json::Error,
    },

    /// The `values` of a specification entry could not be parsed.
    #[error("invalid specification values for {code}")]
    InvalidSpecification {
        code: String,
        #[source]
        source: serde_json::Error,
    },

    /// A status timestamp is outside the representable range.
    #[error("invalid timestamp {0}")]
    InvalidTimestamp(i64),
}

impl TuyaCodecError {
    /// Convert into a [`BridgeError::Transport`] for propagation across port
    /// boundaries.
    #[must_use]
    pub fn into_domain(self) -> BridgeError {
        BridgeError::Transport(Box::new(self))
    }
}

impl From<TuyaCodecError> for BridgeError {
    fn from(err: TuyaCodecError) -> Self {
        err.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("{{bad").unwrap_err()
    }

    #[test]
    fn should_display_invalid_payload_error() {
        let err = TuyaCodecError::InvalidPayload(json_error());
        assert_eq!(err.to_string(), "invalid Tuya payload");
    }

    #[test]
    fn should_display_invalid_colour_error_with_code() {
        let err = TuyaCodecError::InvalidColour {
            code: "colour_data".to_string(),
            source: json_error(),
        };
        assert_eq!(err.to_string(), "invalid colour data for colour_data");
    }

    #[test]
    fn should_convert_to_transport_error() {
        let err: BridgeError = TuyaCodecError::InvalidTimestamp(i64::MAX).into();
        assert!(matches!(err, BridgeError::Transport(_)));
    }
}
