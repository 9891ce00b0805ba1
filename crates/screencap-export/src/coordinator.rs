//! Save-dialog and file-write handoff.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use screencap_ipc::{FinalizedRecording, TrimRange};

use crate::artifact::{default_file_name, ExportArtifact, ExtensionFilter};
use crate::{ExportError, ExportResult, FileWriter, SaveDestination};

/// Result of a save attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The artifact was written to this path.
    Saved(PathBuf),

    /// The user dismissed the save prompt. Nothing was written.
    Cancelled,
}

/// Drives a finalized recording to disk.
pub struct ExportCoordinator {
    destination: Box<dyn SaveDestination>,
    writer: Box<dyn FileWriter>,
    file_name_prefix: String,
    pending: Option<ExportArtifact>,
}

impl ExportCoordinator {
    /// Create a coordinator over the given services.
    pub fn new(destination: Box<dyn SaveDestination>, writer: Box<dyn FileWriter>) -> Self {
        Self {
            destination,
            writer,
            file_name_prefix: "vid".to_string(),
            pending: None,
        }
    }

    /// Set the prefix of the default file name offered by the save prompt.
    pub fn with_file_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_name_prefix = prefix.into();
        self
    }

    /// Assemble the artifact for `recording`.
    ///
    /// The bytes are the full capture even when `trim` is set; trim markers
    /// travel along as metadata only.
    pub fn export(&self, recording: &FinalizedRecording, trim: Option<TrimRange>) -> ExportArtifact {
        ExportArtifact::from_recording(recording, trim)
    }

    /// Prompt for a save location. `None` means the user cancelled.
    #[instrument(name = "request_destination", skip(self))]
    pub fn request_destination(&self, extension: &str) -> Option<PathBuf> {
        let default_name = default_file_name(&self.file_name_prefix, extension);
        let filter = ExtensionFilter::for_extension(extension);
        let path = self.destination.prompt_save_location(&default_name, &filter);
        if path.is_none() {
            debug!("Save prompt cancelled");
        }
        path
    }

    /// Write `artifact` to `path`. On failure the artifact is retained for
    /// [`retry`](Self::retry).
    #[instrument(name = "write_artifact", skip(self, artifact), fields(path = %path.display(), size = artifact.len()))]
    pub fn write(&mut self, path: &Path, artifact: ExportArtifact) -> ExportResult<()> {
        match self.writer.write(path, &artifact.bytes) {
            Ok(()) => {
                info!("Recording saved");
                self.pending = None;
                Ok(())
            }
            Err(source) => {
                warn!("Write failed, keeping artifact for retry: {}", source);
                self.pending = Some(artifact);
                Err(ExportError::Write {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    /// Export, prompt, and write in one go.
    pub fn save(
        &mut self,
        recording: &FinalizedRecording,
        trim: Option<TrimRange>,
    ) -> ExportResult<ExportOutcome> {
        let artifact = self.export(recording, trim);
        self.prompt_and_write(artifact)
    }

    /// Write the artifact kept by the last failed write to `path`.
    pub fn retry(&mut self, path: &Path) -> ExportResult<()> {
        let artifact = self.pending.take().ok_or(ExportError::NothingToRetry)?;
        self.write(path, artifact)
    }

    /// Prompt again and write the artifact kept by the last failed write.
    ///
    /// Cancelling keeps the artifact retained.
    pub fn retry_with_prompt(&mut self) -> ExportResult<ExportOutcome> {
        let artifact = self.pending.take().ok_or(ExportError::NothingToRetry)?;
        let outcome = self.prompt_and_write(artifact.clone());
        if matches!(outcome, Ok(ExportOutcome::Cancelled)) {
            self.pending = Some(artifact);
        }
        outcome
    }

    /// Artifact retained by a failed write, if any.
    pub fn pending(&self) -> Option<&ExportArtifact> {
        self.pending.as_ref()
    }

    /// Drop any retained artifact.
    pub fn clear_pending(&mut self) {
        self.pending = None;
    }

    fn prompt_and_write(&mut self, artifact: ExportArtifact) -> ExportResult<ExportOutcome> {
        let Some(path) = self.request_destination(&artifact.extension) else {
            return Ok(ExportOutcome::Cancelled);
        };
        self.write(&path, artifact)?;
        Ok(ExportOutcome::Saved(path))
    }
}
