//! JSON tensor encoding

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use model_loader::{ForwardInputs, Outputs};
use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

/// A tensor as `{ "shape": [...], "data": [...] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TensorJson {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

impl TensorJson {
    fn into_array(self) -> Result<ArrayD<f32>> {
        let len = self.data.len();
        ArrayD::from_shape_vec(IxDyn(&self.shape), self.data)
            .with_context(|| format!("shape {:?} does not fit {} values", self.shape, len))
    }

    fn from_array(array: &ArrayD<f32>) -> Self {
        Self {
            shape: array.shape().to_vec(),
            data: array.iter().copied().collect(),
        }
    }
}

/// Accepted input file layouts
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InputsJson {
    Positional(Vec<TensorJson>),
    Single(TensorJson),
    Named(BTreeMap<String, TensorJson>),
}

/// Parse forward inputs from JSON text
pub fn parse_inputs(text: &str) -> Result<ForwardInputs> {
    let parsed: InputsJson = serde_json::from_str(text).context("parsing input tensors")?;
    Ok(match parsed {
        InputsJson::Positional(tensors) => ForwardInputs::List(
            tensors
                .into_iter()
                .map(TensorJson::into_array)
                .collect::<Result<_>>()?,
        ),
        InputsJson::Single(tensor) => ForwardInputs::Single(tensor.into_array()?),
        InputsJson::Named(map) => ForwardInputs::Named(
            map.into_iter()
                .map(|(name, tensor)| -> Result<(String, ArrayD<f32>)> {
                    Ok((name, tensor.into_array()?))
                })
                .collect::<Result<_>>()?,
        ),
    })
}

/// Read forward inputs from a JSON file, or from `reader` without one
pub fn read_inputs(path: Option<&Path>, reader: impl Read) -> Result<ForwardInputs> {
    let text = match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
        }
        None => io::read_to_string(reader).context("reading input tensors from stdin")?,
    };
    parse_inputs(&text)
}

/// Encode outputs as JSON, mirroring the output mode
pub fn outputs_to_json(outputs: &Outputs) -> Result<serde_json::Value> {
    let value = match outputs {
        Outputs::List(arrays) => serde_json::to_value(
            arrays.iter().map(TensorJson::from_array).collect::<Vec<_>>(),
        )?,
        Outputs::Dict(map) => serde_json::to_value(
            map.iter()
                .map(|(name, array)| (name.clone(), TensorJson::from_array(array)))
                .collect::<BTreeMap<_, _>>(),
        )?,
    };
    Ok(value)
}
