//! Recording session state machine types.

use serde::{Deserialize, Serialize};

/// The current state of the recording session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No source bound.
    #[default]
    Idle,

    /// A capture stream has been acquired for a source.
    SourceBound,

    /// An encoder has been constructed and is ready to record.
    Armed,

    /// Chunks are being delivered.
    Recording,

    /// Capture stream released; chunks are waiting to be sealed.
    Stopped,

    /// A finalized recording is available.
    Finalized,

    /// An unrecoverable error occurred. Only rebinding a source leaves this state.
    Failed,
}

impl SessionState {
    /// Returns true if chunks are currently being recorded.
    pub fn is_recording(self) -> bool {
        matches!(self, Self::Recording)
    }

    /// Returns true if the session holds an encoder or a live stream
    /// that counts against the single-session guard.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Armed | Self::Recording)
    }

    /// Returns true if the session has reached a state with no further
    /// forward transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finalized | Self::Failed)
    }

    /// Returns a simple string representation of the state.
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::SourceBound => "SourceBound",
            Self::Armed => "Armed",
            Self::Recording => "Recording",
            Self::Stopped => "Stopped",
            Self::Finalized => "Finalized",
            Self::Failed => "Failed",
        }
    }
}

/// Reason a recording was stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// User requested stop.
    UserRequested,

    /// The engine is shutting down.
    Shutdown,

    /// The capture layer stopped delivering chunks.
    StreamEnded { message: String },
}

impl StopReason {
    /// Returns a display message for this reason.
    pub fn message(&self) -> String {
        match self {
            Self::UserRequested => "Recording stopped by user".to_string(),
            Self::Shutdown => "Recording stopped on shutdown".to_string(),
            Self::StreamEnded { message } => format!("Capture stream ended: {message}"),
        }
    }
}
