//! Engine enumerations and their string lookup tables

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Compute device an instance runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// Reference implementation, host memory
    Naive,
    X86,
    Arm,
    OpenCl,
    Metal,
    Cuda,
}

impl DeviceType {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Naive => "naive",
            DeviceType::X86 => "x86",
            DeviceType::Arm => "arm",
            DeviceType::OpenCl => "opencl",
            DeviceType::Metal => "metal",
            DeviceType::Cuda => "cuda",
        }
    }

    /// Whether tensors on this device live in host memory
    pub fn is_host(&self) -> bool {
        matches!(self, DeviceType::Naive | DeviceType::X86 | DeviceType::Arm)
    }
}

impl FromStr for DeviceType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gpu" | "cuda" => Ok(DeviceType::Cuda),
            "cpu" | "x86" => Ok(DeviceType::X86),
            "arm" => Ok(DeviceType::Arm),
            "naive" => Ok(DeviceType::Naive),
            "metal" => Ok(DeviceType::Metal),
            "opencl" => Ok(DeviceType::OpenCl),
            _ => Err(ConfigError::unsupported("device_type", s)),
        }
    }
}

/// Network backend that compiles and executes the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    /// Let the engine choose
    #[default]
    Auto,
    /// Built-in TNN runtime
    Default,
    OpenVino,
    CoreMl,
    TensorRt,
    /// Serialized-graph runtime used for TorchScript models
    TnnTorch,
    Atlas,
}

impl NetworkType {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Auto => "auto",
            NetworkType::Default => "default",
            NetworkType::OpenVino => "openvino",
            NetworkType::CoreMl => "coreml",
            NetworkType::TensorRt => "tensorrt",
            NetworkType::TnnTorch => "tnntorch",
            NetworkType::Atlas => "atlas",
        }
    }
}

impl FromStr for NetworkType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(NetworkType::Auto),
            "default" => Ok(NetworkType::Default),
            "openvino" => Ok(NetworkType::OpenVino),
            "coreml" => Ok(NetworkType::CoreMl),
            "tensorrt" => Ok(NetworkType::TensorRt),
            "tnntorch" => Ok(NetworkType::TnnTorch),
            "atlas" => Ok(NetworkType::Atlas),
            _ => Err(ConfigError::unsupported("network_type", s)),
        }
    }
}

/// Arithmetic precision requested from the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    #[default]
    Auto,
    Normal,
    /// fp32
    High,
    /// fp16 / bfp16
    Low,
}

impl Precision {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Auto => "auto",
            Precision::Normal => "normal",
            Precision::High => "high",
            Precision::Low => "low",
        }
    }
}

impl FromStr for Precision {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Precision::Auto),
            "normal" => Ok(Precision::Normal),
            "high" | "fp32" | "float32" => Ok(Precision::High),
            "low" | "fp16" | "float16" | "bfp16" => Ok(Precision::Low),
            _ => Err(ConfigError::unsupported("precision", s)),
        }
    }
}

/// Blob memory layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    #[default]
    Auto,
    Nchw,
    Nhwc,
    Nhwc4,
    Nc4hw4,
    Ncdhw,
}

impl DataFormat {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::Auto => "auto",
            DataFormat::Nchw => "nchw",
            DataFormat::Nhwc => "nhwc",
            DataFormat::Nhwc4 => "nhwc4",
            DataFormat::Nc4hw4 => "nc4hw4",
            DataFormat::Ncdhw => "ncdhw",
        }
    }
}

impl FromStr for DataFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(DataFormat::Auto),
            "nchw" => Ok(DataFormat::Nchw),
            "nhwc" => Ok(DataFormat::Nhwc),
            "nhwc4" => Ok(DataFormat::Nhwc4),
            "nc4hw4" => Ok(DataFormat::Nc4hw4),
            "ncdhw" => Ok(DataFormat::Ncdhw),
            _ => Err(ConfigError::unsupported("data_format", s)),
        }
    }
}

/// How an instance shares intermediate blob memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareMemoryMode {
    #[default]
    Default,
    /// Instances created on the same thread share one arena
    ShareOneThread,
    /// Caller supplies the arena after creation
    SetFromExternal,
}

impl ShareMemoryMode {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareMemoryMode::Default => "default",
            ShareMemoryMode::ShareOneThread => "share_one_thread",
            ShareMemoryMode::SetFromExternal => "set_from_external",
        }
    }
}

impl FromStr for ShareMemoryMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(ShareMemoryMode::Default),
            "share_one_thread" => Ok(ShareMemoryMode::ShareOneThread),
            "set_from_external" => Ok(ShareMemoryMode::SetFromExternal),
            _ => Err(ConfigError::unsupported("share_memory_mode", s)),
        }
    }
}

/// On-disk model format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    /// Paired `.tnnproto` descriptor and `.tnnmodel` weights
    Tnn,
    /// Pre-compiled serialized graph
    TorchScript,
}

impl ModelType {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Tnn => "tnn",
            ModelType::TorchScript => "torchscript",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(DeviceType, NetworkType, Precision, DataFormat, ShareMemoryMode, ModelType);
