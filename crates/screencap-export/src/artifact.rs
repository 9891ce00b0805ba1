//! Export artifact assembly.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;

use screencap_ipc::{FinalizedRecording, TrimRange};

/// Bytes ready to be written, plus the container metadata that goes with them.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    /// The full, untrimmed recording.
    pub bytes: Bytes,

    pub mime_type: String,

    /// Suggested file extension without the dot.
    pub extension: String,

    /// Trim markers chosen by the user. Advisory only; `bytes` is not cut.
    pub trim: Option<TrimRange>,
}

impl ExportArtifact {
    /// Assemble an artifact from a finalized recording.
    ///
    /// The trim range is attached as metadata. The bytes are always the
    /// whole capture: nothing is re-encoded on export.
    pub fn from_recording(recording: &FinalizedRecording, trim: Option<TrimRange>) -> Self {
        Self {
            bytes: recording.data.clone(),
            mime_type: recording.mime_type.clone(),
            extension: recording.extension.clone(),
            trim,
        }
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// File-type filter shown in the save dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    /// Label, e.g. "WEBM files".
    pub name: String,

    /// Extensions without the dot.
    pub extensions: Vec<String>,
}

impl ExtensionFilter {
    /// Filter for a single extension.
    pub fn for_extension(extension: &str) -> Self {
        Self {
            name: format!("{} files", extension.to_uppercase()),
            extensions: vec![extension.to_string()],
        }
    }
}

/// Default file name offered by the save dialog: `<prefix>-<unix millis>.<ext>`.
pub fn default_file_name(prefix: &str, extension: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("{prefix}-{millis}.{extension}")
}
