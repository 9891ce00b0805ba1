//! Error types for the export module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while exporting a recording.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The file writer failed. The artifact is kept for a retry.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Retry requested with no artifact retained from a failed write.
    #[error("No failed export to retry")]
    NothingToRetry,
}

impl ExportError {
    /// Returns true if the same artifact can be written again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}
