//! Error types for the Heatgrid engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and the simulation run.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: heatgrid_core::config::ConfigError,
    },

    /// The initial grid could not be built.
    #[error("grid error: {source}")]
    Grid {
        /// The underlying grid error.
        #[from]
        source: heatgrid_core::grid::GridError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: heatgrid_core::runner::RunnerError,
    },

    /// The async runtime could not be created.
    #[error("runtime error: {source}")]
    Runtime {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The log subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the logging failure.
        message: String,
    },
}
