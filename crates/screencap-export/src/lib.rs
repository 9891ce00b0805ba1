//! Export of finalized recordings.
//!
//! This crate turns a finalized recording into a byte artifact and hands
//! it to the save-dialog and file-write services.

mod artifact;
mod coordinator;
mod error;

pub use artifact::{default_file_name, ExportArtifact, ExtensionFilter};
pub use coordinator::{ExportCoordinator, ExportOutcome};
pub use error::ExportError;

use std::io;
use std::path::{Path, PathBuf};

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Native save-file dialog.
pub trait SaveDestination: Send {
    /// Ask the user where to save. `None` means the prompt was cancelled.
    fn prompt_save_location(&self, default_name: &str, filter: &ExtensionFilter) -> Option<PathBuf>;
}

/// Writes an artifact to storage.
pub trait FileWriter: Send {
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// [`FileWriter`] backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFileWriter;

impl FileWriter for FsFileWriter {
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        std::fs::write(path, bytes)
    }
}
