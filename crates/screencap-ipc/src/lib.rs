//! Typed UI<->Engine messages for the screen recorder.
//!
//! This crate defines the message types exchanged between a UI shell and
//! the recording engine, plus the plain data types every other crate in
//! the workspace shares.

mod commands;
mod events;
mod state;
mod types;

pub use commands::SessionCommand;
pub use events::SessionEvent;
pub use state::{SessionState, StopReason};
pub use types::{
    CaptureSource, FinalizedRecording, PresetInfo, QualityTier, RecordingStats,
    RecordingSummary, SourceKind, TrimRange, MIN_TRIM_SPAN_SECS,
};

use crossbeam_channel::{Receiver, Sender};

/// Channel capacity for commands (UI → Engine).
pub const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// Channel capacity for events (Engine → UI).
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Creates a bounded command channel.
pub fn command_channel() -> (Sender<SessionCommand>, Receiver<SessionCommand>) {
    crossbeam_channel::bounded(COMMAND_CHANNEL_CAPACITY)
}

/// Creates a bounded event channel.
pub fn event_channel() -> (Sender<SessionEvent>, Receiver<SessionEvent>) {
    crossbeam_channel::bounded(EVENT_CHANNEL_CAPACITY)
}
