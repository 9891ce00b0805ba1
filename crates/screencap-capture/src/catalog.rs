//! Cached list of capturable sources.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, instrument, warn};

use screencap_ipc::{CaptureSource, SourceKind};

use crate::{CaptureResult, SourceEnumerator};

/// Fetches and caches the sources reported by a [`SourceEnumerator`].
///
/// A refresh swaps the whole list at once. Snapshots handed out earlier
/// stay valid, and a failed refresh leaves the cache untouched.
pub struct SourceCatalog {
    enumerator: Box<dyn SourceEnumerator>,
    cache: RwLock<Arc<Vec<CaptureSource>>>,
}

impl SourceCatalog {
    /// Create an empty catalog over the given enumerator.
    pub fn new(enumerator: Box<dyn SourceEnumerator>) -> Self {
        Self {
            enumerator,
            cache: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Query the enumerator for windows and screens and replace the cache.
    #[instrument(name = "refresh_sources", skip(self))]
    pub fn refresh(&self) -> CaptureResult<Arc<Vec<CaptureSource>>> {
        let sources = match self.enumerator.query(&SourceKind::ALL) {
            Ok(sources) => Arc::new(sources),
            Err(e) => {
                warn!("Source query failed, keeping previous list: {}", e);
                return Err(e);
            }
        };

        *self.cache.write() = Arc::clone(&sources);
        debug!(count = sources.len(), "Capture sources refreshed");
        Ok(sources)
    }

    /// Snapshot of the cached sources.
    pub fn sources(&self) -> Arc<Vec<CaptureSource>> {
        Arc::clone(&self.cache.read())
    }

    /// Find a cached source by id.
    pub fn find(&self, id: &str) -> Option<CaptureSource> {
        self.cache.read().iter().find(|s| s.id == id).cloned()
    }

    /// Number of cached sources.
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}
