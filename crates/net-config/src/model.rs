//! Model configuration record

use std::path::PathBuf;

use crate::ModelType;

/// Model content handed to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelParams {
    /// Descriptor text and raw weights, already read from disk
    Tnn { proto: String, weights: Vec<u8> },
    /// Serialized graph, loaded by the engine itself
    TorchScript { path: PathBuf },
}

/// Model configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub model_type: ModelType,
    pub params: ModelParams,
}

impl ModelConfig {
    pub fn tnn(proto: impl Into<String>, weights: Vec<u8>) -> Self {
        Self {
            model_type: ModelType::Tnn,
            params: ModelParams::Tnn {
                proto: proto.into(),
                weights,
            },
        }
    }

    pub fn torchscript(path: impl Into<PathBuf>) -> Self {
        Self {
            model_type: ModelType::TorchScript,
            params: ModelParams::TorchScript { path: path.into() },
        }
    }
}
