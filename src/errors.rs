//! Errors for the AIS decoder
use thiserror::Error;

/// Reasons a single sentence or feed payload is dropped.
///
/// Every kind is recoverable at the per-sentence boundary: the sentence is
/// discarded, no partial record is emitted, and no decoder state changes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("Bad NMEA envelope: {0}")]
    BadEnvelope(String),

    #[error("NMEA checksum mismatch: sentence carries {expected:02X}, computed {computed:02X}")]
    ChecksumFailed { expected: u8, computed: u8 },

    #[error("Talker {0:?} is not AIVDM or AIVDO")]
    NotAivdm(String),

    #[error("Bad AIVDM frame: {0}")]
    BadFrame(String),

    #[error("Fragment {number} of {count} requires upstream reassembly")]
    FragmentedUnsupported { number: u32, count: u32 },

    #[error("Invalid armor character {0:?} in payload")]
    InvalidArmor(char),

    #[error("No decoder for message type {0}")]
    UnsupportedType(u8),

    #[error("Payload truncated: read of {width} bits at {start} exceeds {available} available")]
    Truncated {
        start: usize,
        width: usize,
        available: usize,
    },

    #[error("MMSI {0:?} is not a nine-digit identifier")]
    BadIdentity(String),
}

impl DecodeError {
    /// Kinds that point at physical-layer trouble rather than a malformed
    /// or unsupported message. Callers log these at warn, the rest at debug.
    pub fn is_signal_problem(&self) -> bool {
        matches!(
            self,
            DecodeError::ChecksumFailed { .. } | DecodeError::Truncated { .. }
        )
    }
}

/// Application-level errors for the decoder service.
#[derive(Error, Debug)]
pub enum AisDecoderError {
    #[error("MQTT connection failed")]
    MqttConnectionError(#[from] rumqttc::ConnectionError),

    #[error("MQTT client error")]
    MqttClientError(#[from] rumqttc::ClientError),

    #[error("Serialization error")]
    SerdeError(#[from] serde_json::Error),

    #[error("Configuration error")]
    ConfigError(#[from] config::ConfigError),

    #[error("IO error")]
    IoError(#[from] std::io::Error),

    #[error("Sentence dropped")]
    DecodeError(#[from] DecodeError),

    #[error("Configuration invalid: {message}")]
    ConfigurationError { message: String },
}
