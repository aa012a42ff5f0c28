//! Inference Engine
//!
//! The narrow interface the loader drives an inference engine through,
//! the engine-native tensor (`Mat`) that crosses it, and two engines:
//! a scriptable mock and a tract-backed runtime for serialized graphs.

mod engine;
mod mat;
pub mod mock;
mod tract;

pub use engine::{Engine, Instance};
pub use mat::{convert_array_to_mat, convert_mat_to_array, Mat, MatConvertParam, MatType};
pub use mock::MockEngine;
pub use tract::{TractEngine, TractInstance};

use net_config::ModelType;
use thiserror::Error;

/// Errors reported by an engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Model type {0} is not supported by this engine")]
    UnsupportedModel(ModelType),
    #[error("Engine has no model; call init first")]
    NotInitialized,
    #[error("Instance creation failed: {0}")]
    InstanceCreation(String),
    #[error("Invalid input {name}: {reason}")]
    InvalidInput { name: String, reason: String },
    #[error("Invalid input shape for {name}: expected {expected}, got {actual}")]
    InvalidInputShape {
        name: String,
        expected: String,
        actual: String,
    },
    #[error("No blob named {0}")]
    UnknownBlob(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Mat dims {dims:?} need {expected} elements, got {actual}")]
    MatShape {
        dims: Vec<usize>,
        expected: usize,
        actual: usize,
    },
}
