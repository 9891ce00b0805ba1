//! Error types for the engine.

use thiserror::Error;

use screencap_capture::CaptureError;
use screencap_encoder::{EncoderError, PresetKind};
use screencap_ipc::SessionState;

/// Errors raised by session transitions and engine commands.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The source enumeration service failed.
    #[error("Failed to refresh capture sources: {0}")]
    SourceQuery(#[source] CaptureError),

    /// The requested source is not in the last refreshed list.
    #[error("Unknown capture source: {0}")]
    UnknownSource(String),

    /// The preset key is unknown or not encodable here.
    #[error("Unknown or unsupported preset: {0}")]
    UnknownPreset(String),

    /// The capture stream could not be acquired (includes permission denial).
    #[error("Failed to acquire capture stream for {source_id}: {source}")]
    StreamAcquisition {
        source_id: String,
        source: CaptureError,
    },

    /// The requested preset and its fallback were both rejected.
    #[error("No usable encoder: {requested} rejected, fallback {}", fallback_label(.fallback))]
    EncoderUnavailable {
        requested: PresetKind,
        fallback: Option<PresetKind>,
        source: EncoderError,
    },

    /// `start` called outside `Armed`.
    #[error("Session is not armed (state: {0:?})")]
    NotArmed(SessionState),

    /// `stop` called outside `Recording`.
    #[error("Session is not recording (state: {0:?})")]
    AlreadyStopped(SessionState),

    /// `finalize` found no captured data.
    #[error("No video data recorded")]
    EmptyRecording,

    /// The operation is not valid in the current state.
    #[error("Cannot {operation} while {state:?}")]
    InvalidTransition {
        operation: &'static str,
        state: SessionState,
    },

    /// Another session holds the single-session guard.
    #[error("Another session is already armed or recording")]
    SessionBusy,

    /// Lower-layer encoder failure.
    #[error("Encoder error: {0}")]
    Encoder(#[from] EncoderError),
}

impl SessionError {
    /// Caller misuse that the engine treats as a no-op.
    pub fn is_misuse(&self) -> bool {
        matches!(self, Self::NotArmed(_) | Self::AlreadyStopped(_))
    }

    /// Whether the user can continue without rebinding a source.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::EmptyRecording | Self::EncoderUnavailable { .. } | Self::Encoder(_)
        )
    }
}

fn fallback_label(fallback: &Option<PresetKind>) -> &'static str {
    fallback.map(PresetKind::key).unwrap_or("unavailable")
}

/// Errors loading [`RecorderConfig`](crate::RecorderConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Errors from trim marker updates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrimError {
    /// Duration must be finite and at least the minimum trim span.
    #[error("Cannot trim a recording of {0} seconds")]
    InvalidDuration(f64),

    /// Marker positions must be finite.
    #[error("Invalid trim position: {0}")]
    InvalidPosition(f64),

    /// No recording has been attached yet.
    #[error("Trim selector not initialized")]
    NotInitialized,
}
