//! Main engine loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use tracing::{debug, error, info, instrument, warn};

use screencap_capture::{CaptureAcquirer, SourceCatalog, SourceEnumerator};
use screencap_encoder::{
    CaptureFormatRegistry, EncoderCapability, EncoderConfig, EncoderFactory, MediaProbe, PresetKind,
};
use screencap_export::{
    ExportCoordinator, ExportOutcome, ExportResult, FileWriter, SaveDestination,
};
use screencap_ipc::{QualityTier, SessionCommand, SessionEvent, SessionState, StopReason};

use crate::config::RecorderConfig;
use crate::error::{SessionError, TrimError};
use crate::session::{CaptureSession, SessionGuard, SessionServices};
use crate::trim::TrimSelector;

/// How long the loop waits for a command before pumping chunks.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Every external service the engine talks to.
pub struct EngineServices {
    pub enumerator: Box<dyn SourceEnumerator>,
    pub acquirer: Box<dyn CaptureAcquirer>,
    pub capability: Box<dyn EncoderCapability>,
    pub encoders: Box<dyn EncoderFactory>,
    pub probe: Box<dyn MediaProbe>,
    pub destination: Box<dyn SaveDestination>,
    pub writer: Box<dyn FileWriter>,
}

/// The recording engine.
///
/// Owns the one [`CaptureSession`] of the application and drives it, the
/// trim selector and the exporter from [`SessionCommand`]s on a single
/// control thread.
pub struct Engine {
    command_rx: Receiver<SessionCommand>,
    event_tx: Sender<SessionEvent>,
    config: RecorderConfig,
    catalog: SourceCatalog,
    registry: Arc<CaptureFormatRegistry>,
    session: CaptureSession,
    trim: TrimSelector,
    exporter: ExportCoordinator,
    last_progress: Instant,
}

impl Engine {
    /// Create a new engine.
    pub fn new(
        command_rx: Receiver<SessionCommand>,
        event_tx: Sender<SessionEvent>,
        services: EngineServices,
        config: RecorderConfig,
    ) -> Self {
        Self::with_guard(command_rx, event_tx, services, config, SessionGuard::new())
    }

    /// Create an engine whose session shares `guard` with other sessions.
    pub fn with_guard(
        command_rx: Receiver<SessionCommand>,
        event_tx: Sender<SessionEvent>,
        services: EngineServices,
        config: RecorderConfig,
        guard: SessionGuard,
    ) -> Self {
        let registry = Arc::new(CaptureFormatRegistry::new(services.capability));
        let session = CaptureSession::new(
            SessionServices {
                acquirer: services.acquirer,
                encoders: services.encoders,
                probe: services.probe,
            },
            Arc::clone(&registry),
            guard,
            &config,
        );
        let exporter = ExportCoordinator::new(services.destination, services.writer)
            .with_file_name_prefix(config.file_name_prefix.clone());

        Self {
            command_rx,
            event_tx,
            catalog: SourceCatalog::new(services.enumerator),
            registry,
            session,
            trim: TrimSelector::new(),
            exporter,
            config,
            last_progress: Instant::now(),
        }
    }

    /// Run the engine (blocking).
    #[instrument(name = "engine_run", skip(self))]
    pub fn run(&mut self) {
        info!("Engine starting");
        self.send_event(SessionEvent::Ready);

        loop {
            let received = self.command_rx.recv_timeout(POLL_INTERVAL);
            if !self.step(received) {
                break;
            }
        }

        info!("Engine stopped");
    }

    /// Read-only access to the session for observers.
    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    /// Handle one poll result. Chunks are pumped on every iteration, not
    /// only when the poll times out. Returns false if the engine should stop.
    fn step(&mut self, received: Result<SessionCommand, RecvTimeoutError>) -> bool {
        match received {
            Ok(command) => {
                if !self.handle_command(command) {
                    return false;
                }
                self.tick();
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                self.tick();
                true
            }
            Err(RecvTimeoutError::Disconnected) => {
                info!("Command channel disconnected, shutting down");
                self.stop_recording(StopReason::Shutdown);
                false
            }
        }
    }

    /// Handle a command. Returns false if the engine should stop.
    fn handle_command(&mut self, command: SessionCommand) -> bool {
        debug!(?command, "Handling command");
        let before = self.session.state();

        match command {
            SessionCommand::RefreshSources => self.refresh_sources(),
            SessionCommand::GetPresets => self.send_presets(),
            SessionCommand::BindSource { source_id } => self.bind_source(&source_id),
            SessionCommand::Arm {
                preset_key,
                quality,
            } => self.arm(preset_key, quality),
            SessionCommand::Start => {
                if let Err(e) = self.session.start() {
                    self.report(e);
                } else {
                    self.last_progress = Instant::now();
                }
            }
            SessionCommand::Stop => self.stop_recording(StopReason::UserRequested),
            SessionCommand::Finalize => self.finalize(),
            SessionCommand::SetTrimStart(value) => {
                let result = self.trim.set_start(value);
                self.send_trim(result);
            }
            SessionCommand::SetTrimEnd(value) => {
                let result = self.trim.set_end(value);
                self.send_trim(result);
            }
            SessionCommand::Save => self.save(),
            SessionCommand::RetrySave => {
                let result = self.exporter.retry_with_prompt();
                self.send_export(result);
            }
            SessionCommand::GetState => {
                let state = self.session.state();
                self.send_event(SessionEvent::StateChanged {
                    previous: state,
                    current: state,
                });
            }
            SessionCommand::Shutdown => {
                self.stop_recording(StopReason::Shutdown);
                self.send_state_change(before);
                self.send_event(SessionEvent::Shutdown);
                return false;
            }
        }

        self.send_state_change(before);
        true
    }

    /// Pump delivered chunks and publish progress.
    fn tick(&mut self) {
        if !self.session.state().is_recording() {
            return;
        }

        self.session.pump();

        if self.session.delivery_ended() {
            let before = self.session.state();
            self.stop_recording(StopReason::StreamEnded {
                message: "encoder closed its chunk channel".to_string(),
            });
            self.send_state_change(before);
            return;
        }

        if self.last_progress.elapsed() >= self.config.timeslice() {
            self.last_progress = Instant::now();
            self.send_event(SessionEvent::Progress(self.session.stats()));
        }
    }

    fn refresh_sources(&mut self) {
        match self.catalog.refresh() {
            Ok(sources) => self.send_event(SessionEvent::Sources(sources.to_vec())),
            Err(e) => self.report(SessionError::SourceQuery(e)),
        }
    }

    fn send_presets(&self) {
        let presets = self
            .registry
            .available_presets()
            .iter()
            .map(|preset| preset.info())
            .collect();
        self.send_event(SessionEvent::Presets(presets));
    }

    fn bind_source(&mut self, source_id: &str) {
        let Some(source) = self.catalog.find(source_id) else {
            self.report(SessionError::UnknownSource(source_id.to_string()));
            return;
        };

        match self.session.bind_source(source) {
            Ok(()) => {
                self.trim.clear();
                self.exporter.clear_pending();
            }
            Err(e) => self.report(e),
        }
    }

    fn arm(&mut self, preset_key: Option<String>, quality: Option<QualityTier>) {
        let preset_key = preset_key.unwrap_or_else(|| self.config.default_preset.clone());
        let quality = quality.unwrap_or(self.config.default_quality);

        // Known presets the runtime cannot encode still go to the session,
        // which substitutes a fallback.
        let Some(kind) = PresetKind::from_key(&preset_key) else {
            self.report(SessionError::UnknownPreset(preset_key));
            return;
        };

        match self.session.arm(EncoderConfig::new(kind.preset(), quality)) {
            Ok(outcome) => {
                if let Some(fallback) = outcome.fallback {
                    self.send_event(SessionEvent::FormatFallback {
                        requested: fallback.requested.key().to_string(),
                        substituted: fallback.substituted.key().to_string(),
                        bitrate: outcome.config.bitrate,
                    });
                }
            }
            Err(e) => self.report(e),
        }
    }

    #[instrument(name = "stop_recording", skip(self))]
    fn stop_recording(&mut self, reason: StopReason) {
        match self.session.stop() {
            Ok(()) => {
                info!("{}", reason.message());
                self.send_event(SessionEvent::Progress(self.session.stats()));
            }
            Err(e) => self.report(e),
        }
    }

    fn finalize(&mut self) {
        let recording = match self.session.finalize() {
            Ok(recording) => recording,
            Err(e) => {
                self.report(e);
                return;
            }
        };

        self.send_event(SessionEvent::Finalized(recording.summary()));
        let initialized = self.trim.initialize(recording.duration_seconds);
        self.send_trim(initialized);
    }

    fn save(&mut self) {
        let Some(recording) = self.session.recording() else {
            self.report(SessionError::InvalidTransition {
                operation: "save",
                state: self.session.state(),
            });
            return;
        };

        let trim = self.trim.range();
        if trim.is_some() {
            debug!(?trim, "Trim markers are advisory; exporting the full recording");
        }
        let result = self.exporter.save(recording, trim);
        self.send_export(result);
    }

    fn send_export(&self, result: ExportResult<ExportOutcome>) {
        match result {
            Ok(ExportOutcome::Saved(path)) => self.send_event(SessionEvent::Saved { path }),
            Ok(ExportOutcome::Cancelled) => self.send_event(SessionEvent::SaveCancelled),
            Err(e) => {
                warn!("Export failed: {}", e);
                self.send_event(SessionEvent::Error {
                    recoverable: e.is_retryable(),
                    message: e.to_string(),
                });
            }
        }
    }

    fn send_trim<T>(&self, result: Result<T, TrimError>) {
        match result {
            Ok(_) => {
                if let Some(range) = self.trim.range() {
                    self.send_event(SessionEvent::TrimChanged(range));
                }
            }
            Err(e) => {
                debug!("Trim update ignored: {}", e);
                self.send_event(SessionEvent::Error {
                    recoverable: true,
                    message: e.to_string(),
                });
            }
        }
    }

    /// Publish an error. Caller misuse is logged and swallowed.
    fn report(&self, e: SessionError) {
        if e.is_misuse() {
            debug!("Ignoring misuse: {}", e);
            return;
        }

        if e.is_recoverable() {
            warn!("{}", e);
        } else {
            error!("{}", e);
        }
        self.send_event(SessionEvent::Error {
            recoverable: e.is_recoverable(),
            message: e.to_string(),
        });
    }

    fn send_state_change(&self, previous: SessionState) {
        let current = self.session.state();
        if previous != current {
            self.send_event(SessionEvent::StateChanged { previous, current });
        }
    }

    fn send_event(&self, event: SessionEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            warn!("Failed to send event: {}", e);
        }
    }
}
