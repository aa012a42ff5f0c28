//! Model format detection by file suffix

use std::fs;
use std::path::{Path, PathBuf};

use net_config::{ModelConfig, ModelType};
use tracing::debug;

use crate::LoadError;

/// Suffix of TNN descriptor files
pub const TNN_PROTO_SUFFIX: &str = "tnnproto";
/// Suffix of TNN weights files
pub const TNN_MODEL_SUFFIX: &str = "tnnmodel";

/// Model format implied by a path
pub fn detect_model_type(path: &Path) -> ModelType {
    match path.to_str() {
        Some(s) if s.ends_with(TNN_PROTO_SUFFIX) => ModelType::Tnn,
        _ => ModelType::TorchScript,
    }
}

/// Weights path paired with a descriptor path.
///
/// Only the last `tnnproto` is replaced, so directories that happen to
/// contain the token are left alone.
pub fn weights_path_for(proto_path: &str) -> String {
    replace_last(proto_path, TNN_PROTO_SUFFIX, TNN_MODEL_SUFFIX)
}

fn replace_last(source: &str, what: &str, with: &str) -> String {
    match source.rfind(what) {
        Some(at) => format!("{}{}{}", &source[..at], with, &source[at + what.len()..]),
        None => format!("{with}{source}"),
    }
}

/// Read a model from disk into the config handed to the engine.
///
/// Descriptor models are read eagerly (text descriptor, binary weights);
/// serialized graphs are passed to the engine by path.
pub fn read_model_config(path: &Path) -> Result<ModelConfig, LoadError> {
    match detect_model_type(path) {
        ModelType::Tnn => {
            let proto_str = path.to_string_lossy();
            let weights_path = PathBuf::from(weights_path_for(&proto_str));
            debug!(
                "Reading descriptor {} and weights {}",
                path.display(),
                weights_path.display()
            );

            let proto = fs::read_to_string(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let weights = fs::read(&weights_path).map_err(|source| LoadError::Io {
                path: weights_path.clone(),
                source,
            })?;
            Ok(ModelConfig::tnn(proto, weights))
        }
        ModelType::TorchScript => Ok(ModelConfig::torchscript(path)),
    }
}
