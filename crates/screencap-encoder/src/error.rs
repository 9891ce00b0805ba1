//! Error types for the encoder module.

use thiserror::Error;

/// Errors that can occur during encoder configuration and operation.
#[derive(Debug, Clone, Error)]
pub enum EncoderError {
    /// The preset key is unknown or not encodable on this runtime.
    #[error("Unknown or unsupported preset: {0}")]
    UnknownPreset(String),

    /// The encoder rejected the requested configuration.
    #[error("Unsupported encoder configuration: {mime_type} @ {bitrate} bps")]
    UnsupportedConfig { mime_type: String, bitrate: u32 },

    /// General initialization error.
    #[error("Encoder initialization failed: {0}")]
    Initialization(String),
}

impl EncoderError {
    /// Returns true if the error means the configuration itself is not
    /// encodable, so a different preset may succeed.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedConfig { .. })
    }
}
