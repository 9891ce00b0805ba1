//! Recording engine for the screen recorder.
//!
//! This crate owns the capture session state machine and coordinates the
//! capture, encoder, and export crates behind a command/event loop.

mod config;
mod error;
mod logging;
mod orchestrator;
mod session;
mod trim;

#[cfg(test)]
mod testing;

pub use config::RecorderConfig;
pub use error::{ConfigError, SessionError, TrimError};
pub use logging::init_logging;
pub use orchestrator::{Engine, EngineServices};
pub use session::{
    ArmOutcome, CaptureSession, PresetFallback, SessionGuard, SessionResult, SessionServices,
};
pub use trim::{TrimResult, TrimSelector, TrimView};

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tracing::info;

use screencap_ipc::{SessionCommand, SessionEvent};

/// Create an engine instance with IPC channels.
pub fn create_engine(
    command_rx: Receiver<SessionCommand>,
    event_tx: Sender<SessionEvent>,
    services: EngineServices,
    config: RecorderConfig,
) -> Engine {
    Engine::new(command_rx, event_tx, services, config)
}

/// Run an engine on its own thread. Returns the command sender, the event
/// receiver and the thread handle.
pub fn spawn_engine(
    services: EngineServices,
    config: RecorderConfig,
) -> std::io::Result<(Sender<SessionCommand>, Receiver<SessionEvent>, JoinHandle<()>)> {
    let (command_tx, command_rx) = screencap_ipc::command_channel();
    let (event_tx, event_rx) = screencap_ipc::event_channel();

    let handle = thread::Builder::new()
        .name("screencap-engine".into())
        .spawn(move || {
            info!("Engine thread starting");
            let mut engine = create_engine(command_rx, event_tx, services, config);
            engine.run();
            info!("Engine thread stopped");
        })?;

    Ok((command_tx, event_rx, handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use screencap_ipc::SessionState;

    use crate::testing::Harness;

    #[test]
    fn test_spawned_engine_answers_and_shuts_down() {
        let harness = Harness::new();
        let (commands, events, handle) =
            spawn_engine(harness.engine_services(), harness.config.clone()).unwrap();

        assert!(matches!(
            events.recv_timeout(Duration::from_secs(5)),
            Ok(SessionEvent::Ready)
        ));

        commands.send(SessionCommand::GetState).unwrap();
        assert!(matches!(
            events.recv_timeout(Duration::from_secs(5)),
            Ok(SessionEvent::StateChanged { current: SessionState::Idle, .. })
        ));

        commands.send(SessionCommand::Shutdown).unwrap();
        assert!(matches!(
            events.recv_timeout(Duration::from_secs(5)),
            Ok(SessionEvent::Shutdown)
        ));
        handle.join().unwrap();
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging();
        init_logging();
    }
}
