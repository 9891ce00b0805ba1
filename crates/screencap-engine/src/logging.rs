//! Logging setup for hosts embedding the engine.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "screencap_engine=debug,screencap_capture=debug,screencap_encoder=debug,screencap_export=debug";

/// Initialize logging.
///
/// `RUST_LOG` overrides the default filter. Calling this again after a
/// subscriber is installed does nothing.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
