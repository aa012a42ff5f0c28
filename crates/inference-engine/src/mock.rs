//! Scriptable in-memory engine for tests and development
//!
//! `MockEngine` never looks at model content. Instances remember how they
//! were created and what was bound to them; forward emits one output per
//! bound input, named `<input>_out`, holding the input scaled by a factor.

use std::collections::BTreeMap;

use net_config::{DeviceType, InputShapesMap, ModelConfig, NetworkConfig};
use tracing::{debug, info};

use crate::{Engine, EngineError, Instance, Mat, MatConvertParam, MatType};

/// Which creation entry point produced an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationKind {
    /// No shape information
    Plain,
    /// One fixed shape map
    FixedShapes,
    /// Min/max shape maps
    ShapeRange,
}

/// Mock inference engine
#[derive(Debug, Clone)]
pub struct MockEngine {
    inputs: Vec<String>,
    output_scale: f32,
    reject_reason: Option<String>,
    fail_forward: bool,
    model: Option<ModelConfig>,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    /// Engine with a single declared input, `input_0`
    pub fn new() -> Self {
        Self::with_inputs(&["input_0"])
    }

    /// Engine declaring the given input names; the first is the default input
    pub fn with_inputs(names: &[&str]) -> Self {
        info!("Creating mock inference engine");
        Self {
            inputs: names.iter().map(|n| n.to_string()).collect(),
            output_scale: 1.0,
            reject_reason: None,
            fail_forward: false,
            model: None,
        }
    }

    /// Engine whose `init` rejects every model
    pub fn rejecting(reason: &str) -> Self {
        Self {
            reject_reason: Some(reason.to_string()),
            ..Self::new()
        }
    }

    /// Multiply outputs by `scale`
    pub fn with_output_scale(mut self, scale: f32) -> Self {
        self.output_scale = scale;
        self
    }

    /// Make every forward pass fail
    pub fn failing_forward(mut self) -> Self {
        self.fail_forward = true;
        self
    }

    /// Model config from the last successful `init`
    pub fn model(&self) -> Option<&ModelConfig> {
        self.model.as_ref()
    }

    fn instance(
        &self,
        config: &NetworkConfig,
        creation: CreationKind,
        min_shapes: Option<&InputShapesMap>,
        max_shapes: Option<&InputShapesMap>,
    ) -> Result<MockInstance, EngineError> {
        if self.model.is_none() {
            return Err(EngineError::NotInitialized);
        }
        debug!(
            "Mock instance: {:?} on {} via {}",
            creation, config.device_type, config.network_type
        );
        Ok(MockInstance {
            config: config.clone(),
            creation,
            min_shapes: min_shapes.cloned(),
            max_shapes: max_shapes.cloned(),
            declared_inputs: self.inputs.clone(),
            bound: BTreeMap::new(),
            bind_order: Vec::new(),
            outputs: BTreeMap::new(),
            output_scale: self.output_scale,
            fail_forward: self.fail_forward,
            forward_count: 0,
        })
    }
}

impl Engine for MockEngine {
    type Instance = MockInstance;

    fn init(&mut self, config: &ModelConfig) -> Result<(), EngineError> {
        if let Some(reason) = &self.reject_reason {
            return Err(EngineError::ModelLoadError(reason.clone()));
        }
        debug!("Mock engine accepted {} model", config.model_type);
        self.model = Some(config.clone());
        Ok(())
    }

    fn create_instance(&self, config: &NetworkConfig) -> Result<MockInstance, EngineError> {
        self.instance(config, CreationKind::Plain, None, None)
    }

    fn create_instance_with_shapes(
        &self,
        config: &NetworkConfig,
        shapes: &InputShapesMap,
    ) -> Result<MockInstance, EngineError> {
        self.instance(config, CreationKind::FixedShapes, Some(shapes), Some(shapes))
    }

    fn create_instance_with_range(
        &self,
        config: &NetworkConfig,
        min_shapes: &InputShapesMap,
        max_shapes: &InputShapesMap,
    ) -> Result<MockInstance, EngineError> {
        self.instance(config, CreationKind::ShapeRange, Some(min_shapes), Some(max_shapes))
    }
}

/// Instance created by [`MockEngine`]
#[derive(Debug)]
pub struct MockInstance {
    config: NetworkConfig,
    creation: CreationKind,
    min_shapes: Option<InputShapesMap>,
    max_shapes: Option<InputShapesMap>,
    declared_inputs: Vec<String>,
    bound: BTreeMap<String, Mat>,
    bind_order: Vec<String>,
    outputs: BTreeMap<String, Mat>,
    output_scale: f32,
    fail_forward: bool,
    forward_count: usize,
}

impl MockInstance {
    pub fn creation(&self) -> CreationKind {
        self.creation
    }

    pub fn network_config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn min_shapes(&self) -> Option<&InputShapesMap> {
        self.min_shapes.as_ref()
    }

    pub fn max_shapes(&self) -> Option<&InputShapesMap> {
        self.max_shapes.as_ref()
    }

    /// Input names in the order they were bound
    pub fn bind_order(&self) -> &[String] {
        &self.bind_order
    }

    pub fn bound_input(&self, name: &str) -> Option<&Mat> {
        self.bound.get(name)
    }

    pub fn forward_count(&self) -> usize {
        self.forward_count
    }

    fn check_bounds(&self, name: &str, dims: &[usize]) -> Result<(), EngineError> {
        let (Some(min), Some(max)) = (
            self.min_shapes.as_ref().and_then(|m| m.get(name)),
            self.max_shapes.as_ref().and_then(|m| m.get(name)),
        ) else {
            return Ok(());
        };

        let fits = dims.len() == min.len()
            && dims.len() == max.len()
            && dims
                .iter()
                .zip(min.iter().zip(max.iter()))
                .all(|(&d, (&lo, &hi))| (lo..=hi).contains(&(d as i64)));

        if fits {
            Ok(())
        } else {
            Err(EngineError::InvalidInputShape {
                name: name.to_string(),
                expected: format!("{:?}..={:?}", min, max),
                actual: format!("{:?}", dims),
            })
        }
    }
}

impl Instance for MockInstance {
    fn set_input_mat(
        &mut self,
        mut mat: Mat,
        param: &MatConvertParam,
        name: Option<&str>,
    ) -> Result<(), EngineError> {
        let name = match name {
            Some(n) => n.to_string(),
            None => self
                .declared_inputs
                .first()
                .cloned()
                .ok_or_else(|| EngineError::InvalidInput {
                    name: String::new(),
                    reason: "model declares no inputs".to_string(),
                })?,
        };

        self.check_bounds(&name, mat.dims())?;
        param.apply(&mut mat);

        debug!("Mock bind {} {:?}", name, mat.dims());
        if self.bound.insert(name.clone(), mat).is_none() {
            self.bind_order.push(name);
        }
        Ok(())
    }

    fn forward(&mut self) -> Result<(), EngineError> {
        if self.fail_forward {
            return Err(EngineError::InferenceFailed("mock forward failure".to_string()));
        }
        if self.bound.is_empty() {
            return Err(EngineError::InferenceFailed("no inputs bound".to_string()));
        }

        self.outputs = self
            .bound
            .iter()
            .map(|(name, mat)| {
                let data = mat.data().iter().map(|v| v * self.output_scale).collect();
                Mat::new(DeviceType::Naive, MatType::NchwFloat, mat.dims().to_vec(), data)
                    .map(|out| (format!("{name}_out"), out))
            })
            .collect::<Result<_, _>>()?;
        self.forward_count += 1;
        Ok(())
    }

    fn input_names(&self) -> Vec<String> {
        self.declared_inputs.clone()
    }

    /// One `<input>_out` per bound input, in bind order
    fn output_names(&self) -> Vec<String> {
        self.bind_order
            .iter()
            .map(|name| format!("{name}_out"))
            .filter(|name| self.outputs.contains_key(name))
            .collect()
    }

    fn get_output_mat(
        &self,
        param: &MatConvertParam,
        name: &str,
        device_type: DeviceType,
        mat_type: MatType,
    ) -> Result<Mat, EngineError> {
        let mut mat = self
            .outputs
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownBlob(name.to_string()))?;
        param.apply(&mut mat);
        Ok(mat.with_placement(device_type, mat_type))
    }
}
