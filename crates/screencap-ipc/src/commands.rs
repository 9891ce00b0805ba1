//! Commands sent from the UI to the engine.

use serde::{Deserialize, Serialize};

use crate::types::QualityTier;

/// Commands that the UI can send to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionCommand {
    /// Re-enumerate the available capture sources.
    RefreshSources,

    /// Request the presets the runtime can encode.
    GetPresets,

    /// Bind the session to a source from the last refresh.
    BindSource { source_id: String },

    /// Construct an encoder for the bound source.
    ///
    /// `None` fields take the engine's configured defaults.
    Arm {
        preset_key: Option<String>,
        quality: Option<QualityTier>,
    },

    /// Begin recording.
    Start,

    /// Stop recording.
    Stop,

    /// Seal the recorded chunks into a playable recording.
    Finalize,

    /// Move the trim start marker (seconds).
    SetTrimStart(f64),

    /// Move the trim end marker (seconds).
    SetTrimEnd(f64),

    /// Prompt for a destination and write the recording.
    Save,

    /// Write the artifact retained by a failed save to a new prompt destination.
    RetrySave,

    /// Request current session state.
    GetState,

    /// Shutdown the engine completely.
    Shutdown,
}
