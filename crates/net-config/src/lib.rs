//! Network and Model Configuration
//!
//! Typed configuration records handed to the inference engine, plus the
//! normalization layer that turns loosely-typed configuration dictionaries
//! into those records:
//! - Device, backend, and precision lookup tables
//! - Network configuration parsing with per-field type checks
//! - Input shape bounds for dynamic-shape instances

mod error;
mod model;
mod network;
mod parse;
mod shapes;
mod types;
mod value;

pub use error::ConfigError;
pub use model::{ModelConfig, ModelParams};
pub use network::NetworkConfig;
pub use parse::{parse_device_type, parse_network_config, parse_network_type, parse_precision};
pub use shapes::{
    input_name, parse_input_ranges, parse_shape_specs, shape_specs_from_value, Dims,
    InputShapesMap, ShapeSpec,
};
pub use types::{DataFormat, DeviceType, ModelType, NetworkType, Precision, ShareMemoryMode};
pub use value::{ConfigDict, ConfigValue};

/// Well-known configuration dictionary keys
pub mod keys {
    pub const DEVICE_TYPE: &str = "device_type";
    pub const DEVICE_ID: &str = "device_id";
    pub const DATA_FORMAT: &str = "data_format";
    pub const NETWORK_TYPE: &str = "network_type";
    pub const SHARE_MEMORY_MODE: &str = "share_memory_mode";
    pub const LIBRARY_PATH: &str = "library_path";
    pub const PRECISION: &str = "precision";
    pub const CACHE_PATH: &str = "cache_path";
    pub const ENABLE_TUNE_KERNEL: &str = "enable_tune_kernel";
    pub const INPUT_SHAPES: &str = "input_shapes";

    /// Every key the loader understands
    pub const ALL: [&str; 10] = [
        DEVICE_TYPE,
        DEVICE_ID,
        DATA_FORMAT,
        NETWORK_TYPE,
        SHARE_MEMORY_MODE,
        LIBRARY_PATH,
        PRECISION,
        CACHE_PATH,
        ENABLE_TUNE_KERNEL,
        INPUT_SHAPES,
    ];
}
