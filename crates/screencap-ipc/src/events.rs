//! Events sent from the engine to the UI.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::state::SessionState;
use crate::types::{CaptureSource, PresetInfo, RecordingStats, RecordingSummary, TrimRange};

/// Events that the engine can send to the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Session state has changed.
    StateChanged {
        /// Previous state.
        previous: SessionState,

        /// Current state.
        current: SessionState,
    },

    /// List of available capture sources.
    Sources(Vec<CaptureSource>),

    /// Presets the runtime can encode.
    Presets(Vec<PresetInfo>),

    /// The requested preset was rejected and another one was armed instead.
    FormatFallback {
        requested: String,
        substituted: String,
        bitrate: u32,
    },

    /// Periodic recording progress.
    Progress(RecordingStats),

    /// A recording was finalized.
    Finalized(RecordingSummary),

    /// Trim markers moved.
    TrimChanged(TrimRange),

    /// Recording written to disk.
    Saved { path: PathBuf },

    /// The user dismissed the save prompt.
    SaveCancelled,

    /// Error occurred.
    Error {
        /// Whether the error is recoverable.
        recoverable: bool,

        /// Error message.
        message: String,
    },

    /// Engine is ready.
    Ready,

    /// Engine has shut down.
    Shutdown,
}
