//! Control unit error type.
//!
//! Every variant is fatal for the run. The limit advisory is not an error
//! and never surfaces here.

use pendulum_common::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum ControlError {
    /// Configuration could not be loaded or failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Telemetry log could not be created.
    #[error("Failed to open telemetry log {path:?}: {source}")]
    LogOpen {
        /// Requested log path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing a telemetry record failed.
    #[error("Failed to write telemetry record: {0}")]
    LogWrite(#[from] csv::Error),

    /// Flushing the log or console failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Shutdown signal handler could not be installed.
    #[error("Failed to install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}
