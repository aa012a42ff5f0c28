//! tract-backed engine for serialized graphs
//!
//! Runs ONNX graphs on the host CPU. Paired descriptor/weights models are
//! not understood by tract and are rejected at `init`. Inputs are addressed
//! by their graph name or by position as `input_<n>`.

use std::collections::HashMap;

use net_config::{DeviceType, InputShapesMap, ModelConfig, ModelParams, NetworkConfig};
use tracing::{debug, info, warn};
use tract_onnx::prelude::*;

use crate::{Engine, EngineError, Instance, Mat, MatConvertParam, MatType};

type Plan = TypedRunnableModel<TypedModel>;

/// Engine running serialized graphs through tract
#[derive(Default)]
pub struct TractEngine {
    model: Option<InferenceModel>,
}

impl TractEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn build(
        &self,
        config: &NetworkConfig,
        pinned: Option<&InputShapesMap>,
    ) -> Result<TractInstance, EngineError> {
        let mut model = self.model.clone().ok_or(EngineError::NotInitialized)?;

        if !config.device_type.is_host() {
            warn!(
                "tract runs on the host CPU; device {} (id {}) ignored",
                config.device_type, config.device_id
            );
        }

        let input_names = declared_inputs(&model)?;

        let mut pinned_dims = HashMap::new();
        if let Some(shapes) = pinned {
            for (key, dims) in shapes {
                let index = resolve_shape_key(&input_names, key)?;
                let dims = to_usize_dims(key, dims)?;
                debug!("Pinning input {} to {:?}", input_names[index], dims);
                let fact = InferenceFact::dt_shape(DatumType::F32, dims.clone());
                model = model
                    .with_input_fact(index, fact)
                    .map_err(creation_error)?;
                pinned_dims.insert(input_names[index].clone(), dims);
            }
        }

        // Graph tensor names, read before optimization renames nodes
        let output_names = model
            .output_outlets()
            .map_err(creation_error)?
            .iter()
            .map(|&outlet| match model.outlet_label(outlet) {
                Some(label) => label.to_string(),
                None => model.node(outlet.node).name.clone(),
            })
            .collect::<Vec<_>>();
        let plan = model
            .into_optimized()
            .and_then(|typed| typed.into_runnable())
            .map_err(creation_error)?;

        info!(
            "tract instance ready: {} inputs, {} outputs",
            input_names.len(),
            output_names.len()
        );

        Ok(TractInstance {
            plan,
            input_names,
            output_names,
            pinned: pinned_dims,
            inputs: HashMap::new(),
            outputs: HashMap::new(),
        })
    }
}

impl Engine for TractEngine {
    type Instance = TractInstance;

    fn init(&mut self, config: &ModelConfig) -> Result<(), EngineError> {
        let path = match &config.params {
            ModelParams::TorchScript { path } => path,
            ModelParams::Tnn { .. } => return Err(EngineError::UnsupportedModel(config.model_type)),
        };

        info!("Loading serialized graph from {}", path.display());
        let model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(|e| EngineError::ModelLoadError(e.to_string()))?;
        self.model = Some(model);
        Ok(())
    }

    fn create_instance(&self, config: &NetworkConfig) -> Result<TractInstance, EngineError> {
        self.build(config, None)
    }

    fn create_instance_with_shapes(
        &self,
        config: &NetworkConfig,
        shapes: &InputShapesMap,
    ) -> Result<TractInstance, EngineError> {
        self.build(config, Some(shapes))
    }

    fn create_instance_with_range(
        &self,
        config: &NetworkConfig,
        min_shapes: &InputShapesMap,
        max_shapes: &InputShapesMap,
    ) -> Result<TractInstance, EngineError> {
        if min_shapes == max_shapes {
            return self.build(config, Some(max_shapes));
        }
        let model = self.model.as_ref().ok_or(EngineError::NotInitialized)?;
        let input_names = declared_inputs(model)?;
        for key in min_shapes.keys().chain(max_shapes.keys()) {
            resolve_shape_key(&input_names, key)?;
        }

        // Inputs with min == max are pinned; symbolic dims cover the rest
        let fixed: InputShapesMap = min_shapes
            .iter()
            .filter(|(key, dims)| max_shapes.get(*key) == Some(*dims))
            .map(|(key, dims)| (key.clone(), dims.clone()))
            .collect();
        debug!(
            "Shape range given; pinning {} of {} inputs",
            fixed.len(),
            input_names.len()
        );
        self.build(config, Some(&fixed))
    }
}

/// Runnable tract plan plus bound inputs and last outputs
pub struct TractInstance {
    plan: Plan,
    input_names: Vec<String>,
    output_names: Vec<String>,
    pinned: HashMap<String, Vec<usize>>,
    inputs: HashMap<String, Tensor>,
    outputs: HashMap<String, Tensor>,
}

impl Instance for TractInstance {
    fn set_input_mat(
        &mut self,
        mut mat: Mat,
        param: &MatConvertParam,
        name: Option<&str>,
    ) -> Result<(), EngineError> {
        let name = match name {
            Some(n) => resolve_input(&self.input_names, n)
                .map(|index| self.input_names[index].clone())
                .ok_or_else(|| EngineError::InvalidInput {
                    name: n.to_string(),
                    reason: format!("not a model input (inputs: {:?})", self.input_names),
                })?,
            None => self.input_names.first().cloned().ok_or_else(|| {
                EngineError::InvalidInput {
                    name: String::new(),
                    reason: "model declares no inputs".to_string(),
                }
            })?,
        };
        if let Some(dims) = self.pinned.get(&name) {
            if dims.as_slice() != mat.dims() {
                return Err(EngineError::InvalidInputShape {
                    name,
                    expected: format!("{:?}", dims),
                    actual: format!("{:?}", mat.dims()),
                });
            }
        }

        param.apply(&mut mat);
        let tensor = Tensor::from_shape::<f32>(mat.dims(), mat.data()).map_err(|e| {
            EngineError::InvalidInput {
                name: name.clone(),
                reason: e.to_string(),
            }
        })?;
        self.inputs.insert(name, tensor);
        Ok(())
    }

    fn forward(&mut self) -> Result<(), EngineError> {
        let inputs = self
            .input_names
            .iter()
            .map(|name| {
                self.inputs
                    .get(name)
                    .cloned()
                    .map(TValue::from)
                    .ok_or_else(|| EngineError::InvalidInput {
                        name: name.clone(),
                        reason: "not bound".to_string(),
                    })
            })
            .collect::<Result<TVec<TValue>, _>>()?;

        let results = self
            .plan
            .run(inputs)
            .map_err(|e| EngineError::InferenceFailed(e.to_string()))?;

        self.outputs = self
            .output_names
            .iter()
            .cloned()
            .zip(results.into_iter().map(|value| value.into_tensor()))
            .collect();
        Ok(())
    }

    fn input_names(&self) -> Vec<String> {
        self.input_names.clone()
    }

    fn output_names(&self) -> Vec<String> {
        self.output_names.clone()
    }

    fn get_output_mat(
        &self,
        param: &MatConvertParam,
        name: &str,
        device_type: DeviceType,
        mat_type: MatType,
    ) -> Result<Mat, EngineError> {
        if mat_type != MatType::NchwFloat {
            return Err(EngineError::InferenceFailed(format!(
                "tract outputs can only be read as {:?}, not {:?}",
                MatType::NchwFloat,
                mat_type
            )));
        }

        let tensor = self
            .outputs
            .get(name)
            .ok_or_else(|| EngineError::UnknownBlob(name.to_string()))?;
        let tensor = tensor
            .cast_to::<f32>()
            .map_err(|e| EngineError::InferenceFailed(e.to_string()))?;
        let view = tensor
            .to_array_view::<f32>()
            .map_err(|e| EngineError::InferenceFailed(e.to_string()))?;

        let mut mat = Mat::new(
            device_type,
            mat_type,
            view.shape().to_vec(),
            view.iter().copied().collect(),
        )?;
        param.apply(&mut mat);
        Ok(mat)
    }
}

fn declared_inputs(model: &InferenceModel) -> Result<Vec<String>, EngineError> {
    Ok(model
        .input_outlets()
        .map_err(creation_error)?
        .iter()
        .map(|outlet| model.node(outlet.node).name.clone())
        .collect())
}

/// Index of a declared input, by its own name or by position as `input_<n>`
fn resolve_input(declared: &[String], name: &str) -> Option<usize> {
    declared.iter().position(|n| n == name).or_else(|| {
        name.strip_prefix("input_")?
            .parse::<usize>()
            .ok()
            .filter(|&index| index < declared.len())
    })
}

fn resolve_shape_key(declared: &[String], key: &str) -> Result<usize, EngineError> {
    resolve_input(declared, key).ok_or_else(|| {
        EngineError::InstanceCreation(format!(
            "shape given for unknown input {} (inputs: {:?})",
            key, declared
        ))
    })
}

fn creation_error(e: TractError) -> EngineError {
    EngineError::InstanceCreation(e.to_string())
}

fn to_usize_dims(name: &str, dims: &[i64]) -> Result<Vec<usize>, EngineError> {
    dims.iter()
        .map(|&d| {
            usize::try_from(d).map_err(|_| EngineError::InvalidInputShape {
                name: name.to_string(),
                expected: "non-negative dims".to_string(),
                actual: format!("{:?}", dims),
            })
        })
        .collect()
}
