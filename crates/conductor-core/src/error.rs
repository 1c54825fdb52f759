//! Error types for conductor-core.

use thiserror::Error;

/// Configuration and setup errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Failed to spawn thread: {0}")]
    ThreadSpawn(#[from] std::io::Error),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by processors. A successful call returns `Ok`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorError {
    #[error("Processor error")]
    Error,

    #[error("Parameter error")]
    ParameterError,

    #[error("Parameter not found")]
    ParameterNotFound,

    #[error("Out of memory or capacity")]
    MemoryError,

    #[error("Unsupported operation")]
    UnsupportedOperation,

    #[error("Could not open shared library")]
    SharedLibraryOpeningError,

    #[error("Plugin entry point not found")]
    PluginEntryPointNotFound,

    #[error("Plugin failed to load")]
    PluginLoadError,

    #[error("Plugin failed to initialize")]
    PluginInitError,
}

pub type ProcessorResult<T> = std::result::Result<T, ProcessorError>;

/// Failures from the event dispatcher's registration API.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDispatcherError {
    #[error("Already subscribed")]
    AlreadySubscribed,

    #[error("Unknown poster")]
    UnknownPoster,
}
