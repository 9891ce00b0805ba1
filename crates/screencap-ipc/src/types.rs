//! Common types used across IPC messages and crates.

use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Minimum span between trim start and trim end, in seconds.
pub const MIN_TRIM_SPAN_SECS: f64 = 0.1;

/// A capture source (screen or window).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSource {
    /// Opaque identifier assigned by the enumeration service.
    pub id: String,

    /// Display name for the UI.
    pub display_name: String,

    /// Type of capture source.
    pub kind: SourceKind,
}

impl CaptureSource {
    /// Create a new capture source.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            kind,
        }
    }
}

/// Type of capture source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// An application window.
    Window,

    /// A whole screen/display.
    Screen,
}

impl SourceKind {
    /// Every source kind, in enumeration order.
    pub const ALL: [SourceKind; 2] = [SourceKind::Window, SourceKind::Screen];
}

/// Recording quality, applied as a multiplier to a preset's base bitrate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityTier {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityTier {
    /// Bitrate multiplier for this tier.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Low => 0.5,
            Self::Medium => 1.0,
            Self::High => 1.5,
        }
    }

    /// Apply the multiplier to a base bitrate in bits per second.
    pub fn apply(self, base_bitrate: u32) -> u32 {
        (f64::from(base_bitrate) * self.multiplier()).round() as u32
    }
}

/// Preset summary sent to the UI for the format picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetInfo {
    /// Preset key (e.g. "webm-vp9").
    pub key: String,

    /// Display name for the UI.
    pub display_name: String,

    /// File extension without the dot.
    pub extension: String,
}

/// Trim markers over a finalized recording, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimRange {
    pub start: f64,
    pub end: f64,
}

impl TrimRange {
    /// Length of the selected span in seconds.
    pub fn span(&self) -> f64 {
        self.end - self.start
    }
}

/// A sealed recording. Immutable once created.
///
/// `data` is the concatenation of every non-empty chunk in arrival order.
#[derive(Debug, Clone)]
pub struct FinalizedRecording {
    /// Encoded container bytes, written verbatim on export.
    pub data: Bytes,

    /// Container/codec MIME type of `data`.
    pub mime_type: String,

    /// File extension matching the container, without the dot.
    pub extension: String,

    /// Playable duration in seconds.
    pub duration_seconds: f64,

    /// Number of chunks that were sealed into `data`.
    pub chunk_count: usize,
}

impl FinalizedRecording {
    /// Size of the recording in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the recording holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Serializable summary for the UI.
    pub fn summary(&self) -> RecordingSummary {
        RecordingSummary {
            mime_type: self.mime_type.clone(),
            extension: self.extension.clone(),
            duration_seconds: self.duration_seconds,
            size_bytes: self.data.len() as u64,
            chunk_count: self.chunk_count,
        }
    }
}

/// Summary of a finalized recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingSummary {
    pub mime_type: String,
    pub extension: String,
    pub duration_seconds: f64,
    pub size_bytes: u64,
    pub chunk_count: usize,
}

/// Live counters for the recording in progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordingStats {
    /// Chunks accepted into the buffer.
    pub chunk_count: usize,

    /// Total bytes accepted into the buffer.
    pub bytes: u64,

    /// Zero-length chunks that were discarded.
    pub discarded_empty: u64,

    /// Time since recording started.
    pub elapsed: Duration,
}

impl RecordingStats {
    /// Elapsed time as `MM:SS` for the recording timer.
    pub fn elapsed_display(&self) -> String {
        let secs = self.elapsed.as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}
