//! Engine-native tensors and conversion to and from ndarray

use ndarray::{ArrayD, IxDyn};
use net_config::DeviceType;
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Element type and layout of a mat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatType {
    /// f32, NCHW
    NchwFloat,
    /// u8 BGR
    N8uc3,
    /// u8 BGRA
    N8uc4,
    /// u8 single channel
    NGray,
    /// i32, NC
    NcInt32,
}

/// Per-channel preprocessing applied when a mat enters or leaves an instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatConvertParam {
    /// Per-channel multiplier
    pub scale: Vec<f32>,
    /// Per-channel offset, added after scaling
    pub bias: Vec<f32>,
    /// Swap channels 0 and 2 (RGB <-> BGR)
    pub reverse_channel: bool,
}

impl Default for MatConvertParam {
    fn default() -> Self {
        Self {
            scale: vec![1.0; 4],
            bias: vec![0.0; 4],
            reverse_channel: false,
        }
    }
}

impl MatConvertParam {
    /// Whether applying this param leaves data unchanged
    pub fn is_identity(&self) -> bool {
        !self.reverse_channel
            && self.scale.iter().all(|s| *s == 1.0)
            && self.bias.iter().all(|b| *b == 0.0)
    }

    /// Apply scale, bias, and channel reversal in place.
    ///
    /// Channels are taken from dim 1; rank-0 and rank-1 mats are one channel.
    pub fn apply(&self, mat: &mut Mat) {
        if self.is_identity() || mat.data.is_empty() {
            return;
        }

        let channels = mat.dims.get(1).copied().unwrap_or(1).max(1);
        let plane: usize = mat.dims.iter().skip(2).product::<usize>().max(1);

        if self.reverse_channel && channels >= 3 {
            let batch = mat.data.len() / (channels * plane);
            for n in 0..batch {
                let base = n * channels * plane;
                for i in 0..plane {
                    mat.data.swap(base + i, base + 2 * plane + i);
                }
            }
        }

        for (idx, value) in mat.data.iter_mut().enumerate() {
            let c = (idx / plane) % channels;
            let scale = self.scale.get(c).copied().unwrap_or(1.0);
            let bias = self.bias.get(c).copied().unwrap_or(0.0);
            *value = *value * scale + bias;
        }
    }
}

/// Engine-native tensor: dims plus row-major f32 data
#[derive(Debug, Clone, PartialEq)]
pub struct Mat {
    device_type: DeviceType,
    mat_type: MatType,
    dims: Vec<usize>,
    data: Vec<f32>,
}

impl Mat {
    /// Create a mat, checking `data` fills `dims`
    pub fn new(
        device_type: DeviceType,
        mat_type: MatType,
        dims: Vec<usize>,
        data: Vec<f32>,
    ) -> Result<Self, EngineError> {
        let expected: usize = dims.iter().product();
        if expected != data.len() {
            return Err(EngineError::MatShape {
                dims,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            device_type,
            mat_type,
            dims,
            data,
        })
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    pub fn mat_type(&self) -> MatType {
        self.mat_type
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Same data, relabelled for another device and layout
    pub fn with_placement(mut self, device_type: DeviceType, mat_type: MatType) -> Self {
        self.device_type = device_type;
        self.mat_type = mat_type;
        self
    }
}

/// Copy an array into a host-side NCHW float mat
pub fn convert_array_to_mat(array: &ArrayD<f32>) -> Mat {
    Mat {
        device_type: DeviceType::Naive,
        mat_type: MatType::NchwFloat,
        dims: array.shape().to_vec(),
        data: array.iter().copied().collect(),
    }
}

/// Turn a mat back into a row-major array
pub fn convert_mat_to_array(mat: Mat) -> Result<ArrayD<f32>, EngineError> {
    let Mat { dims, data, .. } = mat;
    let expected: usize = dims.iter().product();
    let actual = data.len();
    ArrayD::from_shape_vec(IxDyn(&dims), data).map_err(|_| EngineError::MatShape {
        dims,
        expected,
        actual,
    })
}
