//! Model Loader
//!
//! Entry points that turn a model path and configuration into a runnable
//! [`Module`]. Configuration is validated before the engine is touched;
//! I/O and engine failures are passed through unchanged.
//!
//! Models ending in `tnnproto` are read together with their `tnnmodel`
//! weights. Every other path is a serialized graph, which always runs on
//! the `TnnTorch` backend.

mod error;
mod format;
mod forward;
mod module;

pub use error::{ForwardError, LoadError};
pub use format::{
    detect_model_type, read_model_config, weights_path_for, TNN_MODEL_SUFFIX, TNN_PROTO_SUFFIX,
};
pub use forward::{ForwardInputs, OutputMode, Outputs};
pub use module::{Module, ShapeBounds};

use std::path::Path;

use inference_engine::Engine;
use net_config::{
    keys, parse_input_ranges, parse_network_config, ConfigDict, InputShapesMap, NetworkConfig,
};

/// Load a model using a configuration dictionary.
///
/// Recognized keys are the `NetworkConfig` fields plus `input_shapes`, a
/// list of fixed shapes or `{min, max}` ranges for inputs `input_0`, ...
pub fn load<E: Engine>(
    engine: E,
    model_path: impl AsRef<Path>,
    config: &ConfigDict,
) -> Result<Module<E>, LoadError> {
    let shapes = match config.get(keys::INPUT_SHAPES) {
        Some(value) => {
            let (min, max) = parse_input_ranges(value)?;
            ShapeBounds::Range { min, max }
        }
        None => ShapeBounds::Unspecified,
    };
    let network_config = parse_network_config(config)?;
    Module::new(engine, model_path, Some(network_config), shapes)
}

/// Load a model with an already-built config; `input_shapes` bounds both
/// ends of the shape range.
pub fn load_raw<E: Engine>(
    engine: E,
    model_path: impl AsRef<Path>,
    network_config: Option<NetworkConfig>,
    input_shapes: Option<InputShapesMap>,
) -> Result<Module<E>, LoadError> {
    let shapes = ShapeBounds::from_options(input_shapes.clone(), input_shapes);
    Module::new(engine, model_path, network_config, shapes)
}

/// Load a model with an already-built config and explicit shape bounds
pub fn load_raw_range<E: Engine>(
    engine: E,
    model_path: impl AsRef<Path>,
    network_config: Option<NetworkConfig>,
    min_input_shapes: Option<InputShapesMap>,
    max_input_shapes: Option<InputShapesMap>,
) -> Result<Module<E>, LoadError> {
    let shapes = ShapeBounds::from_options(min_input_shapes, max_input_shapes);
    Module::new(engine, model_path, network_config, shapes)
}
