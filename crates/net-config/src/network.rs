//! Network configuration record

use serde::{Deserialize, Serialize};

use crate::{DataFormat, DeviceType, NetworkType, Precision, ShareMemoryMode};

/// Configuration an instance is created with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Device the instance runs on
    pub device_type: DeviceType,

    /// Device ordinal for multi-device hosts
    pub device_id: i32,

    /// Blob memory layout
    pub data_format: DataFormat,

    /// Backend that compiles and runs the graph
    pub network_type: NetworkType,

    /// Blob memory sharing between instances
    pub share_memory_mode: ShareMemoryMode,

    /// Extra backend library (OpenCL kernels, plugins)
    pub library_path: Option<String>,

    /// Arithmetic precision
    pub precision: Precision,

    /// Directory for compiled-graph caches
    pub cache_path: Option<String>,

    /// Tune kernels on first run
    pub enable_tune_kernel: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            device_type: DeviceType::Cuda,
            device_id: 0,
            data_format: DataFormat::Auto,
            network_type: NetworkType::Auto,
            share_memory_mode: ShareMemoryMode::Default,
            library_path: None,
            precision: Precision::Auto,
            cache_path: None,
            enable_tune_kernel: false,
        }
    }
}

impl NetworkConfig {
    /// Config for a given device, everything else default
    pub fn for_device(device_type: DeviceType) -> Self {
        Self {
            device_type,
            ..Default::default()
        }
    }
}
