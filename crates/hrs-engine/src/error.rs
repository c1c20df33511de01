//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and shutdown so that
//! `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: hrs_core::ConfigError,
    },

    /// The organization could not be constructed from the deployment.
    #[error("organization error: {source}")]
    Organization {
        /// The underlying organization error.
        #[from]
        source: hrs_core::HrsError,
    },

    /// Logging could not be initialized.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the logging failure.
        message: String,
    },

    /// Waiting for the shutdown signal failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The notification listener task panicked or was cancelled.
    #[error("listener error: {message}")]
    Listener {
        /// Description of the listener failure.
        message: String,
    },
}
