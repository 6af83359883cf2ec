//! Drowsiness Monitor
//!
//! Drives the DMS core from a landmark stream, writes one line per frame
//! and keeps the configured alert sink in step with the detector.

pub mod output;
pub mod replay;
pub mod session;
pub mod settings;

pub use output::write_frame_line;
pub use replay::ReplayProvider;
pub use session::{run_session, SessionError, SessionSummary};
pub use settings::{LogSettings, Settings, SettingsError};

use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging. Logs go to stderr, stdout carries frame analyses.
pub fn init_logging(settings: &LogSettings) -> Result<(), SetGlobalDefaultError> {
    // Level is checked when settings are loaded
    let level = settings.level().unwrap_or(tracing::Level::INFO);

    if settings.json {
        let subscriber = FmtSubscriber::builder()
            .json()
            .with_max_level(level)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    }
}
