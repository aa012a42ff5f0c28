//! Loader Error Types

use std::path::PathBuf;

use inference_engine::EngineError;
use net_config::ConfigError;
use thiserror::Error;

/// Errors while loading a model
#[derive(Debug, Error)]
pub enum LoadError {
    /// Configuration failed validation; nothing was loaded
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Model or weights file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Engine rejected the model or the instance configuration
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Errors during a forward pass
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("Forward called without any input tensors")]
    NoInputs,

    #[error("Unknown output mode {0:?}; expected \"list\" or \"dict\"")]
    UnknownOutputMode(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}
