//! Error types for the capture module.

use thiserror::Error;

/// Errors that can occur during capture operations.
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    /// The enumeration service failed or is unreachable.
    #[error("Failed to query capture sources: {0}")]
    SourceQuery(String),

    /// Permission denied for capture.
    #[error("Permission denied for capture of {0}")]
    PermissionDenied(String),

    /// The stream could not be acquired for another reason.
    #[error("Failed to acquire capture stream: {0}")]
    Acquisition(String),
}

impl CaptureError {
    /// Returns true if the error is a permission refusal.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }
}
