//! In-memory collaborators for session and engine tests.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

use screencap_capture::{
    CaptureAcquirer, CaptureError, CaptureResult, CaptureStream, SourceEnumerator,
};
use screencap_encoder::{
    CaptureFormatRegistry, ChunkTimestamp, EncoderCapability, EncoderError, EncoderFactory,
    EncoderResult, EncoderSettings, MediaChunk, MediaEncoder, MediaProbe, CHUNK_CHANNEL_CAPACITY,
};
use screencap_export::{ExtensionFilter, FileWriter, SaveDestination};
use screencap_ipc::{CaptureSource, SourceKind};

use crate::config::RecorderConfig;
use crate::orchestrator::EngineServices;
use crate::session::{CaptureSession, SessionGuard, SessionServices};

/// Test-side handle for pushing chunks into whichever fake encoder is running.
#[derive(Clone)]
pub struct ChunkFeed {
    tx: Arc<Mutex<Option<Sender<MediaChunk>>>>,
    sequence: Arc<AtomicU64>,
    start: Instant,
}

impl ChunkFeed {
    fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
            sequence: Arc::new(AtomicU64::new(0)),
            start: Instant::now(),
        }
    }

    /// Build a chunk without delivering it.
    pub fn chunk(&self, data: Bytes) -> MediaChunk {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        MediaChunk::new(data, ChunkTimestamp::now(self.start), sequence)
    }

    /// Deliver a chunk. Returns false if no encoder is running.
    pub fn deliver(&self, data: Bytes) -> bool {
        let chunk = self.chunk(data);
        match self.tx.lock().as_ref() {
            Some(tx) => tx.send(chunk).is_ok(),
            None => false,
        }
    }
}

struct FakeStream {
    source_id: String,
    active: bool,
    releases: Arc<AtomicUsize>,
}

impl CaptureStream for FakeStream {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn release(&mut self) {
        if self.active {
            self.active = false;
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }
}

struct FakeAcquirer {
    denied: Vec<String>,
    vanished: Vec<String>,
    releases: Arc<AtomicUsize>,
    acquired: Arc<Mutex<Vec<(String, bool)>>>,
}

impl CaptureAcquirer for FakeAcquirer {
    fn acquire(&self, source_id: &str, wants_audio: bool) -> CaptureResult<Box<dyn CaptureStream>> {
        if self.denied.iter().any(|id| id == source_id) {
            return Err(CaptureError::PermissionDenied(source_id.to_string()));
        }
        if self.vanished.iter().any(|id| id == source_id) {
            return Err(CaptureError::Acquisition(format!("{source_id} was closed")));
        }
        self.acquired
            .lock()
            .push((source_id.to_string(), wants_audio));
        Ok(Box::new(FakeStream {
            source_id: source_id.to_string(),
            active: true,
            releases: Arc::clone(&self.releases),
        }))
    }
}

struct FakeEncoder {
    feed: ChunkFeed,
    trailing: Option<Bytes>,
    running: bool,
}

impl MediaEncoder for FakeEncoder {
    fn start(&mut self, _timeslice: Duration) -> EncoderResult<Receiver<MediaChunk>> {
        let (tx, rx) = crossbeam_channel::bounded(CHUNK_CHANNEL_CAPACITY);
        *self.feed.tx.lock() = Some(tx);
        self.running = true;
        Ok(rx)
    }

    fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        if let Some(data) = self.trailing.take() {
            self.feed.deliver(data);
        }
        *self.feed.tx.lock() = None;
    }

    fn name(&self) -> &str {
        "fake"
    }
}

#[derive(Clone, Copy)]
enum ConstructFailure {
    None,
    Initialization,
}

struct FakeEncoderFactory {
    rejected_prefixes: Vec<String>,
    failure: ConstructFailure,
    trailing: Option<Bytes>,
    feed: ChunkFeed,
    constructed: Arc<Mutex<Vec<EncoderSettings>>>,
}

impl EncoderFactory for FakeEncoderFactory {
    fn construct(
        &self,
        stream: &dyn CaptureStream,
        settings: &EncoderSettings,
    ) -> EncoderResult<Box<dyn MediaEncoder>> {
        assert!(stream.is_active());
        self.constructed.lock().push(settings.clone());

        if let ConstructFailure::Initialization = self.failure {
            return Err(EncoderError::Initialization("device lost".into()));
        }
        if self
            .rejected_prefixes
            .iter()
            .any(|prefix| settings.mime_type.starts_with(prefix.as_str()))
        {
            return Err(EncoderError::UnsupportedConfig {
                mime_type: settings.mime_type.clone(),
                bitrate: settings.bitrate,
            });
        }
        Ok(Box::new(FakeEncoder {
            feed: self.feed.clone(),
            trailing: self.trailing.clone(),
            running: false,
        }))
    }
}

/// Reports every mime type as encodable except those starting with one of
/// the listed prefixes.
struct PrefixCapability(Vec<String>);

impl EncoderCapability for PrefixCapability {
    fn is_supported(&self, mime_type: &str) -> bool {
        !self.0.iter().any(|prefix| mime_type.starts_with(prefix.as_str()))
    }
}

struct FixedProbe(Option<f64>);

impl MediaProbe for FixedProbe {
    fn duration_seconds(&self, _data: &[u8], _mime_type: &str) -> Option<f64> {
        self.0
    }
}

struct FixedEnumerator {
    sources: Option<Vec<CaptureSource>>,
}

impl SourceEnumerator for FixedEnumerator {
    fn query(&self, _kinds: &[SourceKind]) -> CaptureResult<Vec<CaptureSource>> {
        self.sources
            .clone()
            .ok_or_else(|| CaptureError::SourceQuery("compositor unreachable".into()))
    }
}

struct FixedDestination(Option<PathBuf>);

impl SaveDestination for FixedDestination {
    fn prompt_save_location(&self, _default_name: &str, _filter: &ExtensionFilter) -> Option<PathBuf> {
        self.0.clone()
    }
}

struct MemoryWriter {
    fail: bool,
    writes: Arc<Mutex<Vec<(PathBuf, usize)>>>,
}

impl FileWriter for MemoryWriter {
    fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        if self.fail {
            return Err(std::io::Error::other("disk full"));
        }
        self.writes.lock().push((path.to_path_buf(), bytes.len()));
        Ok(())
    }
}

/// Builds sessions and engines over shared fakes and exposes what they saw.
pub struct Harness {
    pub feed: ChunkFeed,
    pub guard: SessionGuard,
    pub config: RecorderConfig,
    rejected_prefixes: Vec<String>,
    unsupported_prefixes: Vec<String>,
    failure: ConstructFailure,
    trailing: Option<Bytes>,
    denied: Vec<String>,
    vanished: Vec<String>,
    probe_duration: Option<f64>,
    sources: Option<Vec<CaptureSource>>,
    save_path: Option<PathBuf>,
    fail_writes: bool,
    releases: Arc<AtomicUsize>,
    acquired: Arc<Mutex<Vec<(String, bool)>>>,
    constructed: Arc<Mutex<Vec<EncoderSettings>>>,
    writes: Arc<Mutex<Vec<(PathBuf, usize)>>>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            feed: ChunkFeed::new(),
            guard: SessionGuard::new(),
            config: RecorderConfig::default(),
            rejected_prefixes: Vec::new(),
            unsupported_prefixes: Vec::new(),
            failure: ConstructFailure::None,
            trailing: None,
            denied: Vec::new(),
            vanished: Vec::new(),
            probe_duration: Some(3.0),
            sources: Some(vec![
                CaptureSource::new("screen:0", "Entire Screen", SourceKind::Screen),
                CaptureSource::new("window:7", "Editor", SourceKind::Window),
            ]),
            save_path: Some(PathBuf::from("/tmp/vid.webm")),
            fail_writes: false,
            releases: Arc::new(AtomicUsize::new(0)),
            acquired: Arc::new(Mutex::new(Vec::new())),
            constructed: Arc::new(Mutex::new(Vec::new())),
            writes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Encoder rejects mime types starting with `prefix` as unsupported.
    pub fn rejecting(mut self, prefix: &str) -> Self {
        self.rejected_prefixes.push(prefix.to_string());
        self
    }

    /// Capability check reports mime types starting with `prefix` as unsupported.
    pub fn unsupported(mut self, prefix: &str) -> Self {
        self.unsupported_prefixes.push(prefix.to_string());
        self
    }

    /// Encoder construction fails with a non-capability error.
    pub fn failing_construction(mut self) -> Self {
        self.failure = ConstructFailure::Initialization;
        self
    }

    /// Encoder delivers `data` while stopping.
    pub fn with_trailing_chunk(mut self, data: Bytes) -> Self {
        self.trailing = Some(data);
        self
    }

    /// Acquisition of `source_id` is refused.
    pub fn denying(mut self, source_id: &str) -> Self {
        self.denied.push(source_id.to_string());
        self
    }

    /// Acquisition of `source_id` fails for a reason other than permission.
    pub fn vanishing(mut self, source_id: &str) -> Self {
        self.vanished.push(source_id.to_string());
        self
    }

    pub fn with_probe_duration(mut self, duration: Option<f64>) -> Self {
        self.probe_duration = duration;
        self
    }

    /// Enumeration fails.
    pub fn without_sources(mut self) -> Self {
        self.sources = None;
        self
    }

    /// Save prompt returns `path` (`None` = cancelled).
    pub fn with_save_path(mut self, path: Option<&str>) -> Self {
        self.save_path = path.map(PathBuf::from);
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn registry(&self) -> Arc<CaptureFormatRegistry> {
        Arc::new(CaptureFormatRegistry::new(self.capability()))
    }

    fn capability(&self) -> Box<dyn EncoderCapability> {
        Box::new(PrefixCapability(self.unsupported_prefixes.clone()))
    }

    pub fn session_services(&self) -> SessionServices {
        SessionServices {
            acquirer: Box::new(FakeAcquirer {
                denied: self.denied.clone(),
                vanished: self.vanished.clone(),
                releases: Arc::clone(&self.releases),
                acquired: Arc::clone(&self.acquired),
            }),
            encoders: Box::new(FakeEncoderFactory {
                rejected_prefixes: self.rejected_prefixes.clone(),
                failure: self.failure,
                trailing: self.trailing.clone(),
                feed: self.feed.clone(),
                constructed: Arc::clone(&self.constructed),
            }),
            probe: Box::new(FixedProbe(self.probe_duration)),
        }
    }

    pub fn session(&self) -> CaptureSession {
        CaptureSession::new(
            self.session_services(),
            self.registry(),
            self.guard.clone(),
            &self.config,
        )
    }

    pub fn engine_services(&self) -> EngineServices {
        let session = self.session_services();
        EngineServices {
            enumerator: Box::new(FixedEnumerator {
                sources: self.sources.clone(),
            }),
            acquirer: session.acquirer,
            capability: self.capability(),
            encoders: session.encoders,
            probe: session.probe,
            destination: Box::new(FixedDestination(self.save_path.clone())),
            writer: Box::new(MemoryWriter {
                fail: self.fail_writes,
                writes: Arc::clone(&self.writes),
            }),
        }
    }

    /// Number of capture streams released.
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// `(source_id, wants_audio)` for every acquisition.
    pub fn acquired(&self) -> Vec<(String, bool)> {
        self.acquired.lock().clone()
    }

    /// Settings of every encoder construction attempt.
    pub fn constructed(&self) -> Vec<EncoderSettings> {
        self.constructed.lock().clone()
    }

    /// `(path, byte count)` for every successful write.
    pub fn writes(&self) -> Vec<(PathBuf, usize)> {
        self.writes.lock().clone()
    }
}
