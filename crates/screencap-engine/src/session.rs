//! The recording session state machine.
//!
//! `Idle → SourceBound → Armed → Recording → Stopped → Finalized`, with
//! `Failed` reachable from any non-terminal state. Only `bind_source`
//! leaves `Failed`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use crossbeam_channel::{Receiver, TryRecvError};
use tracing::{debug, error, info, instrument, warn};

use screencap_capture::{CaptureAcquirer, CaptureStream};
use screencap_encoder::{
    CaptureFormatRegistry, EncoderConfig, EncoderError, EncoderFactory, EncoderResult, MediaChunk,
    MediaEncoder, MediaProbe, PresetKind,
};
use screencap_ipc::{CaptureSource, FinalizedRecording, RecordingStats, SessionState};

use crate::config::RecorderConfig;
use crate::error::SessionError;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// External services a session drives.
pub struct SessionServices {
    pub acquirer: Box<dyn CaptureAcquirer>,
    pub encoders: Box<dyn EncoderFactory>,
    pub probe: Box<dyn MediaProbe>,
}

/// Single-session token shared by every session of one application.
///
/// Arming claims it and teardown releases it, so no two sessions can be
/// `Armed` or `Recording` at the same time.
#[derive(Debug, Clone, Default)]
pub struct SessionGuard {
    claimed: Arc<AtomicBool>,
}

impl SessionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if some session currently holds the guard.
    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::SeqCst)
    }

    fn try_claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn release(&self) {
        self.claimed.store(false, Ordering::SeqCst);
    }
}

/// A preset substitution made while arming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetFallback {
    pub requested: PresetKind,
    pub substituted: PresetKind,
}

/// What `arm` actually configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmOutcome {
    /// The active configuration.
    pub config: EncoderConfig,

    /// Set when the requested preset was rejected and replaced.
    pub fallback: Option<PresetFallback>,
}

impl ArmOutcome {
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// One recording, from source selection to a sealed artifact.
pub struct CaptureSession {
    services: SessionServices,
    registry: Arc<CaptureFormatRegistry>,
    guard: SessionGuard,
    holds_guard: bool,
    wants_audio: bool,
    timeslice: Duration,

    state: SessionState,
    source: Option<CaptureSource>,
    config: Option<EncoderConfig>,
    stream: Option<Box<dyn CaptureStream>>,
    encoder: Option<Box<dyn MediaEncoder>>,
    chunk_rx: Option<Receiver<MediaChunk>>,
    delivery_ended: bool,

    chunks: Vec<Bytes>,
    bytes: u64,
    discarded_empty: u64,
    started_at: Option<Instant>,
    stopped_at: Option<Instant>,

    recording: Option<FinalizedRecording>,
    failure: Option<SessionError>,
}

impl CaptureSession {
    /// Create an idle session.
    pub fn new(
        services: SessionServices,
        registry: Arc<CaptureFormatRegistry>,
        guard: SessionGuard,
        config: &RecorderConfig,
    ) -> Self {
        Self {
            services,
            registry,
            guard,
            holds_guard: false,
            wants_audio: config.wants_audio,
            timeslice: config.timeslice(),
            state: SessionState::Idle,
            source: None,
            config: None,
            stream: None,
            encoder: None,
            chunk_rx: None,
            delivery_ended: false,
            chunks: Vec::new(),
            bytes: 0,
            discarded_empty: 0,
            started_at: None,
            stopped_at: None,
            recording: None,
            failure: None,
        }
    }

    /// Acquire a capture stream for `source`, replacing any previous one.
    ///
    /// The previous stream is always released first. If acquisition fails
    /// the session is left `Idle`.
    #[instrument(name = "bind_source", skip_all, fields(source_id = %source.id))]
    pub fn bind_source(&mut self, source: CaptureSource) -> SessionResult<()> {
        if self.state == SessionState::Recording {
            return Err(self.invalid("bind a source"));
        }

        self.teardown();
        self.reset();

        match self.services.acquirer.acquire(&source.id, self.wants_audio) {
            Ok(stream) => {
                info!(kind = ?source.kind, "Capture stream acquired");
                self.stream = Some(stream);
                self.source = Some(source);
                self.transition(SessionState::SourceBound);
                Ok(())
            }
            Err(e) => {
                if e.is_permission_denied() {
                    warn!("Capture permission denied");
                } else {
                    warn!("Stream acquisition failed: {}", e);
                }
                self.transition(SessionState::Idle);
                Err(SessionError::StreamAcquisition {
                    source_id: source.id,
                    source: e,
                })
            }
        }
    }

    /// Construct the encoder for the bound stream.
    ///
    /// If the runtime capability check or the encoder rejects `config` as
    /// unsupported, the first fallback preset that differs from it is tried
    /// once at the same quality. The returned outcome reports any
    /// substitution.
    #[instrument(name = "arm", skip_all, fields(preset = %config.preset.key(), bitrate = config.bitrate))]
    pub fn arm(&mut self, config: EncoderConfig) -> SessionResult<ArmOutcome> {
        match self.state {
            SessionState::SourceBound => {}
            SessionState::Armed => self.release_encoder(),
            _ => return Err(self.invalid("arm")),
        }

        if !self.holds_guard {
            if !self.guard.try_claim() {
                return Err(SessionError::SessionBusy);
            }
            self.holds_guard = true;
        }

        let constructed = if self.registry.supports(config.preset.kind) {
            self.construct_encoder(&config)
        } else {
            Err(EncoderError::UnsupportedConfig {
                mime_type: config.preset.mime_type.to_string(),
                bitrate: config.bitrate,
            })
        };

        let (config, encoder, fallback) = match constructed {
            Ok(encoder) => (config, encoder, None),
            Err(e) if e.is_unsupported() => {
                let requested = config.preset.kind;
                warn!("Encoder rejected {}: {}", requested, e);

                let Some(substitute) = self.registry.fallback_for(requested, config.quality) else {
                    return Err(self.fail(SessionError::EncoderUnavailable {
                        requested,
                        fallback: None,
                        source: e,
                    }));
                };

                match self.construct_encoder(&substitute) {
                    Ok(encoder) => {
                        warn!(substituted = %substitute.preset.kind, "Falling back to another preset");
                        let fallback = PresetFallback {
                            requested,
                            substituted: substitute.preset.kind,
                        };
                        (substitute, encoder, Some(fallback))
                    }
                    Err(e) => {
                        return Err(self.fail(SessionError::EncoderUnavailable {
                            requested,
                            fallback: Some(substitute.preset.kind),
                            source: e,
                        }));
                    }
                }
            }
            Err(e) => return Err(self.fail(SessionError::Encoder(e))),
        };

        info!(encoder = encoder.name(), preset = %config.preset.key(), "Encoder armed");
        self.encoder = Some(encoder);
        self.config = Some(config);
        self.transition(SessionState::Armed);

        Ok(ArmOutcome { config, fallback })
    }

    /// Begin recording. Clears the chunk buffer.
    #[instrument(name = "start", skip(self))]
    pub fn start(&mut self) -> SessionResult<()> {
        if self.state != SessionState::Armed {
            return Err(SessionError::NotArmed(self.state));
        }

        self.chunks.clear();
        self.bytes = 0;
        self.discarded_empty = 0;
        self.delivery_ended = false;

        let timeslice = self.timeslice;
        let started = match self.encoder.as_mut() {
            Some(encoder) => encoder.start(timeslice),
            None => return Err(self.invalid("start without an encoder")),
        };

        match started {
            Ok(rx) => {
                self.chunk_rx = Some(rx);
                self.started_at = Some(Instant::now());
                self.stopped_at = None;
                self.transition(SessionState::Recording);
                info!("Recording started");
                Ok(())
            }
            Err(e) => Err(self.fail(SessionError::Encoder(e))),
        }
    }

    /// Accept one delivered chunk. Returns true if it was appended.
    ///
    /// Chunks outside `Recording` and zero-length chunks are dropped.
    pub fn append_chunk(&mut self, chunk: MediaChunk) -> bool {
        if self.state != SessionState::Recording {
            debug!(sequence = chunk.sequence, state = self.state.name(), "Dropping chunk outside recording");
            return false;
        }

        if chunk.is_empty() {
            self.discarded_empty += 1;
            debug!(sequence = chunk.sequence, "Discarding empty chunk");
            return false;
        }

        debug!(
            sequence = chunk.sequence,
            offset_ms = chunk.timestamp.offset_ms(),
            size = chunk.len(),
            "Chunk appended"
        );
        self.bytes += chunk.len() as u64;
        self.chunks.push(chunk.data);
        true
    }

    /// Drain every chunk delivered so far. Returns how many were appended.
    pub fn pump(&mut self) -> usize {
        if self.state != SessionState::Recording {
            return 0;
        }
        let Some(rx) = self.chunk_rx.take() else {
            return 0;
        };

        let mut appended = 0;
        loop {
            match rx.try_recv() {
                Ok(chunk) => {
                    if self.append_chunk(chunk) {
                        appended += 1;
                    }
                }
                Err(TryRecvError::Empty) => {
                    self.chunk_rx = Some(rx);
                    break;
                }
                Err(TryRecvError::Disconnected) => {
                    warn!("Encoder stopped delivering chunks");
                    self.delivery_ended = true;
                    break;
                }
            }
        }
        appended
    }

    /// Stop recording and release the capture stream.
    ///
    /// A chunk the encoder delivers while stopping is still appended;
    /// anything delivered after teardown is dropped.
    #[instrument(name = "stop", skip(self))]
    pub fn stop(&mut self) -> SessionResult<()> {
        if self.state != SessionState::Recording {
            return Err(SessionError::AlreadyStopped(self.state));
        }

        if let Some(encoder) = self.encoder.as_mut() {
            encoder.stop();
        }
        self.pump();

        self.teardown();
        self.stopped_at = Some(Instant::now());
        self.transition(SessionState::Stopped);
        info!(chunks = self.chunks.len(), bytes = self.bytes, "Recording stopped");
        Ok(())
    }

    /// Seal the chunk buffer into a [`FinalizedRecording`].
    ///
    /// An empty buffer is terminal: the session moves to `Failed`.
    #[instrument(name = "finalize", skip(self))]
    pub fn finalize(&mut self) -> SessionResult<FinalizedRecording> {
        if self.state != SessionState::Stopped {
            return Err(self.invalid("finalize"));
        }
        if self.chunks.is_empty() {
            return Err(self.fail(SessionError::EmptyRecording));
        }
        let Some(config) = self.config else {
            return Err(self.invalid("finalize without an encoder config"));
        };

        let mut data = BytesMut::with_capacity(self.bytes as usize);
        for chunk in &self.chunks {
            data.extend_from_slice(chunk);
        }
        let data = data.freeze();

        let mime_type = config.preset.mime_type;
        let duration_seconds = self
            .services
            .probe
            .duration_seconds(&data, mime_type)
            .filter(|d| d.is_finite() && *d >= 0.0)
            .unwrap_or_else(|| {
                debug!("Probe reported no duration, using wall-clock span");
                self.elapsed().as_secs_f64()
            });

        let recording = FinalizedRecording {
            data,
            mime_type: mime_type.to_string(),
            extension: config.preset.extension.to_string(),
            duration_seconds,
            chunk_count: self.chunks.len(),
        };

        info!(
            size = recording.len(),
            duration_seconds, "Recording finalized"
        );
        self.recording = Some(recording.clone());
        self.transition(SessionState::Finalized);
        Ok(recording)
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The bound source, if any.
    pub fn bound_source(&self) -> Option<&CaptureSource> {
        self.source.as_ref()
    }

    /// The active encoder configuration, if armed.
    pub fn config(&self) -> Option<&EncoderConfig> {
        self.config.as_ref()
    }

    /// The finalized recording, once sealed.
    pub fn recording(&self) -> Option<&FinalizedRecording> {
        self.recording.as_ref()
    }

    /// The error that moved the session to `Failed`.
    pub fn failure(&self) -> Option<&SessionError> {
        self.failure.as_ref()
    }

    /// Returns true once the encoder's chunk channel has closed while recording.
    pub fn delivery_ended(&self) -> bool {
        self.delivery_ended
    }

    /// Time spent recording so far, or the full span once stopped.
    pub fn elapsed(&self) -> Duration {
        match self.started_at {
            Some(start) => self
                .stopped_at
                .unwrap_or_else(Instant::now)
                .saturating_duration_since(start),
            None => Duration::ZERO,
        }
    }

    /// Counters for the recording in progress.
    pub fn stats(&self) -> RecordingStats {
        RecordingStats {
            chunk_count: self.chunks.len(),
            bytes: self.bytes,
            discarded_empty: self.discarded_empty,
            elapsed: self.elapsed(),
        }
    }

    fn construct_encoder(&self, config: &EncoderConfig) -> EncoderResult<Box<dyn MediaEncoder>> {
        let stream = self.stream.as_deref().ok_or_else(|| {
            EncoderError::Initialization("no capture stream bound".into())
        })?;
        self.services.encoders.construct(stream, &config.settings())
    }

    fn transition(&mut self, next: SessionState) {
        let previous = std::mem::replace(&mut self.state, next);
        debug!(
            previous = previous.name(),
            current = next.name(),
            "State transition"
        );
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            operation,
            state: self.state,
        }
    }

    fn fail(&mut self, err: SessionError) -> SessionError {
        error!("Session failed: {}", err);
        self.teardown();
        self.failure = Some(err.clone());
        self.transition(SessionState::Failed);
        err
    }

    fn release_encoder(&mut self) {
        if let Some(mut encoder) = self.encoder.take() {
            encoder.stop();
        }
        self.chunk_rx = None;
    }

    /// Release encoder, stream and guard. Safe to call repeatedly.
    fn teardown(&mut self) {
        self.release_encoder();
        if let Some(mut stream) = self.stream.take() {
            stream.release();
            debug!(source_id = stream.source_id(), "Capture stream released");
        }
        if self.holds_guard {
            self.guard.release();
            self.holds_guard = false;
        }
    }

    fn reset(&mut self) {
        self.source = None;
        self.config = None;
        self.chunks.clear();
        self.bytes = 0;
        self.discarded_empty = 0;
        self.delivery_ended = false;
        self.started_at = None;
        self.stopped_at = None;
        self.recording = None;
        self.failure = None;
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
