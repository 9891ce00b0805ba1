//! Capture source discovery and stream acquisition.
//!
//! The OS-facing work (compositor enumeration, permission prompts, the
//! stream itself) lives behind the traits in this crate. [`SourceCatalog`]
//! caches what the enumerator reports.

mod catalog;
mod error;

pub use catalog::SourceCatalog;
pub use error::CaptureError;

use screencap_ipc::{CaptureSource, SourceKind};

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Enumerates capturable sources from the OS.
pub trait SourceEnumerator: Send {
    /// List sources of the given kinds, in display order.
    fn query(&self, kinds: &[SourceKind]) -> CaptureResult<Vec<CaptureSource>>;
}

/// Acquires a live capture stream for a source.
pub trait CaptureAcquirer: Send {
    /// Acquire a stream. May block on an OS permission prompt.
    ///
    /// Returns [`CaptureError::PermissionDenied`] if the user or OS refuses.
    fn acquire(&self, source_id: &str, wants_audio: bool) -> CaptureResult<Box<dyn CaptureStream>>;
}

/// A live capture stream handle.
pub trait CaptureStream: Send {
    /// Identifier of the source this stream captures.
    fn source_id(&self) -> &str;

    /// Check if the stream still holds OS resources.
    fn is_active(&self) -> bool;

    /// Stop every track and release OS resources.
    ///
    /// Must be idempotent: releasing an already released stream is a no-op.
    fn release(&mut self);
}
