//! Format negotiation and media-encoder abstraction.
//!
//! This crate owns the static preset table, the runtime capability
//! filter with its fallback order, and the traits behind which the
//! platform media encoder lives.

mod chunk;
mod error;
mod preset;
mod registry;

pub use chunk::{ChunkTimestamp, MediaChunk};
pub use error::EncoderError;
pub use preset::{EncoderConfig, EncoderSettings, FormatPreset, PresetKind};
pub use registry::{CaptureFormatRegistry, FALLBACK_ORDER};

use std::time::Duration;

use crossbeam_channel::Receiver;
use screencap_capture::CaptureStream;

/// Channel capacity for delivered chunks.
pub const CHUNK_CHANNEL_CAPACITY: usize = 16;

/// Default delivery cadence while recording.
pub const DEFAULT_TIMESLICE: Duration = Duration::from_secs(1);

/// Result type for encoder operations.
pub type EncoderResult<T> = Result<T, EncoderError>;

/// Runtime check for whether a container/codec can be encoded.
pub trait EncoderCapability: Send + Sync {
    /// Synchronous; never fails.
    fn is_supported(&self, mime_type: &str) -> bool;
}

/// Constructs media encoders over a capture stream.
pub trait EncoderFactory: Send {
    /// Build an encoder for `stream`.
    ///
    /// Returns [`EncoderError::UnsupportedConfig`] if the runtime refuses
    /// the container/codec/bitrate combination.
    fn construct(
        &self,
        stream: &dyn CaptureStream,
        settings: &EncoderSettings,
    ) -> EncoderResult<Box<dyn MediaEncoder>>;
}

/// A constructed media encoder.
pub trait MediaEncoder: Send {
    /// Begin encoding, delivering one chunk per `timeslice` on the returned
    /// channel in order.
    fn start(&mut self, timeslice: Duration) -> EncoderResult<Receiver<MediaChunk>>;

    /// Stop encoding. The encoder delivers any final buffered chunk before
    /// returning. Calling it on a stopped encoder is a no-op.
    fn stop(&mut self);

    /// Encoder name for diagnostics.
    fn name(&self) -> &str;
}

/// Reads metadata from an assembled recording.
pub trait MediaProbe: Send {
    /// Playable duration of `data`, if the container reports one.
    fn duration_seconds(&self, data: &[u8], mime_type: &str) -> Option<f64>;
}
