//! Forward-pass inputs and outputs

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use ndarray::ArrayD;
use tracing::warn;

use crate::ForwardError;

/// Tensors handed to a forward pass
#[derive(Debug, Clone, PartialEq)]
pub enum ForwardInputs {
    /// One tensor, bound to the engine's default input
    Single(ArrayD<f32>),
    /// Positional tensors, bound to `input_0`, `input_1`, ...
    List(Vec<ArrayD<f32>>),
    /// Tensors bound by name, in the given order
    Named(Vec<(String, ArrayD<f32>)>),
}

impl ForwardInputs {
    /// Positional inputs from any sequence of tensors
    pub fn positional(tensors: impl IntoIterator<Item = ArrayD<f32>>) -> Self {
        ForwardInputs::List(tensors.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        match self {
            ForwardInputs::Single(_) => 1,
            ForwardInputs::List(v) => v.len(),
            ForwardInputs::Named(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<ArrayD<f32>> for ForwardInputs {
    fn from(tensor: ArrayD<f32>) -> Self {
        ForwardInputs::Single(tensor)
    }
}

impl From<Vec<ArrayD<f32>>> for ForwardInputs {
    fn from(tensors: Vec<ArrayD<f32>>) -> Self {
        ForwardInputs::List(tensors)
    }
}

impl From<Vec<(String, ArrayD<f32>)>> for ForwardInputs {
    fn from(pairs: Vec<(String, ArrayD<f32>)>) -> Self {
        ForwardInputs::Named(pairs)
    }
}

impl From<BTreeMap<String, ArrayD<f32>>> for ForwardInputs {
    fn from(map: BTreeMap<String, ArrayD<f32>>) -> Self {
        ForwardInputs::Named(map.into_iter().collect())
    }
}

impl From<HashMap<String, ArrayD<f32>>> for ForwardInputs {
    fn from(map: HashMap<String, ArrayD<f32>>) -> Self {
        ForwardInputs::Named(map.into_iter().collect())
    }
}

/// Shape of the value a forward pass returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Outputs in engine order
    #[default]
    List,
    /// Outputs keyed by blob name
    Dict,
}

impl OutputMode {
    /// Lenient flag parsing: anything other than `"dict"` or `"list"` falls
    /// back to [`OutputMode::List`] with a warning.
    pub fn from_flag(flag: &str) -> Self {
        flag.parse().unwrap_or_else(|_| {
            warn!("Unknown output mode {:?}, returning a list", flag);
            OutputMode::List
        })
    }
}

impl FromStr for OutputMode {
    type Err = ForwardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(OutputMode::List),
            "dict" => Ok(OutputMode::Dict),
            other => Err(ForwardError::UnknownOutputMode(other.to_string())),
        }
    }
}

/// Forward-pass result
#[derive(Debug, Clone, PartialEq)]
pub enum Outputs {
    List(Vec<ArrayD<f32>>),
    /// Name and tensor pairs in engine output order
    Dict(Vec<(String, ArrayD<f32>)>),
}

impl Outputs {
    pub(crate) fn collect(mode: OutputMode, named: Vec<(String, ArrayD<f32>)>) -> Self {
        match mode {
            OutputMode::List => Outputs::List(named.into_iter().map(|(_, array)| array).collect()),
            OutputMode::Dict => Outputs::Dict(named),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Outputs::List(v) => v.len(),
            Outputs::Dict(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_list(self) -> Option<Vec<ArrayD<f32>>> {
        match self {
            Outputs::List(v) => Some(v),
            Outputs::Dict(_) => None,
        }
    }

    /// Output by blob name; `None` for list results
    pub fn get(&self, name: &str) -> Option<&ArrayD<f32>> {
        match self {
            Outputs::Dict(pairs) => pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, array)| array),
            Outputs::List(_) => None,
        }
    }

    pub fn into_dict(self) -> Option<Vec<(String, ArrayD<f32>)>> {
        match self {
            Outputs::Dict(m) => Some(m),
            Outputs::List(_) => None,
        }
    }
}
