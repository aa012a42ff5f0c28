//! Loaded model plus its runnable instance

use std::path::{Path, PathBuf};

use inference_engine::{
    convert_array_to_mat, convert_mat_to_array, Engine, Instance, MatConvertParam, MatType,
};
use net_config::{input_name, DeviceType, InputShapesMap, ModelType, NetworkConfig, NetworkType};
use tracing::{debug, info, warn};

use crate::format::read_model_config;
use crate::{ForwardError, ForwardInputs, LoadError, OutputMode, Outputs};

/// Shape information an instance is created with
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ShapeBounds {
    /// Use the model's own input shapes
    #[default]
    Unspecified,
    /// One shape per input
    Fixed(InputShapesMap),
    /// Inputs may vary between `min` and `max`
    Range {
        min: InputShapesMap,
        max: InputShapesMap,
    },
}

impl ShapeBounds {
    /// Bounds from optional min and max maps.
    ///
    /// A max without a min carries no usable bound and is dropped.
    pub fn from_options(min: Option<InputShapesMap>, max: Option<InputShapesMap>) -> Self {
        match (min, max) {
            (None, None) => ShapeBounds::Unspecified,
            (None, Some(_)) => {
                warn!("Max input shapes given without min shapes; ignoring them");
                ShapeBounds::Unspecified
            }
            (Some(shapes), None) => ShapeBounds::Fixed(shapes),
            (Some(min), Some(max)) => ShapeBounds::Range { min, max },
        }
    }
}

/// A model loaded into an engine, ready to run
pub struct Module<E: Engine> {
    model_path: PathBuf,
    model_type: ModelType,
    network_config: NetworkConfig,
    engine: E,
    instance: E::Instance,
}

impl<E: Engine> Module<E> {
    /// Load a model and create an instance for it.
    ///
    /// Serialized-graph models always run on the `TnnTorch` backend, whatever
    /// `network_config` asks for.
    pub fn new(
        mut engine: E,
        model_path: impl AsRef<Path>,
        network_config: Option<NetworkConfig>,
        shapes: ShapeBounds,
    ) -> Result<Self, LoadError> {
        let model_path = model_path.as_ref().to_path_buf();
        info!("Loading model from {}", model_path.display());

        let model_config = read_model_config(&model_path)?;
        engine.init(&model_config)?;

        let mut network_config = network_config.unwrap_or_default();
        if model_config.model_type == ModelType::TorchScript {
            if !matches!(
                network_config.network_type,
                NetworkType::Auto | NetworkType::TnnTorch
            ) {
                warn!(
                    "Serialized-graph model requires the {} backend; overriding {}",
                    NetworkType::TnnTorch,
                    network_config.network_type
                );
            }
            network_config.network_type = NetworkType::TnnTorch;
        }

        let instance = match &shapes {
            ShapeBounds::Unspecified => engine.create_instance(&network_config)?,
            ShapeBounds::Fixed(shapes) => {
                engine.create_instance_with_shapes(&network_config, shapes)?
            }
            ShapeBounds::Range { min, max } => {
                engine.create_instance_with_range(&network_config, min, max)?
            }
        };

        info!(
            "Created {} instance on {} ({})",
            model_config.model_type, network_config.device_type, network_config.network_type
        );

        Ok(Self {
            model_path,
            model_type: model_config.model_type,
            network_config,
            engine,
            instance,
        })
    }

    /// Run one forward pass.
    ///
    /// Blocks until the engine finishes. Outputs are copied to host memory
    /// as row-major float arrays.
    pub fn forward(
        &mut self,
        inputs: impl Into<ForwardInputs>,
        mode: OutputMode,
    ) -> Result<Outputs, ForwardError> {
        let inputs = inputs.into();
        if inputs.is_empty() {
            return Err(ForwardError::NoInputs);
        }

        let param = MatConvertParam::default();
        match inputs {
            ForwardInputs::Single(tensor) => {
                debug!("Binding {:?} to default input", tensor.shape());
                self.instance
                    .set_input_mat(convert_array_to_mat(&tensor), &param, None)?;
            }
            ForwardInputs::List(tensors) => {
                for (index, tensor) in tensors.iter().enumerate() {
                    let name = input_name(index);
                    debug!("Binding {:?} to {}", tensor.shape(), name);
                    self.instance
                        .set_input_mat(convert_array_to_mat(tensor), &param, Some(&name))?;
                }
            }
            ForwardInputs::Named(pairs) => {
                for (name, tensor) in &pairs {
                    debug!("Binding {:?} to {}", tensor.shape(), name);
                    self.instance
                        .set_input_mat(convert_array_to_mat(tensor), &param, Some(name))?;
                }
            }
        }

        self.instance.forward()?;

        let named = self
            .instance
            .output_names()
            .into_iter()
            .map(|name| -> Result<_, ForwardError> {
                let mat = self.instance.get_output_mat(
                    &param,
                    &name,
                    DeviceType::Naive,
                    MatType::NchwFloat,
                )?;
                Ok((name, convert_mat_to_array(mat)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Outputs::collect(mode, named))
    }

    /// Forward pass selecting the output shape by flag (`"list"` or `"dict"`)
    pub fn forward_with_flag(
        &mut self,
        inputs: impl Into<ForwardInputs>,
        flag: &str,
    ) -> Result<Outputs, ForwardError> {
        self.forward(inputs, OutputMode::from_flag(flag))
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    /// Config the instance was actually created with
    pub fn network_config(&self) -> &NetworkConfig {
        &self.network_config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn instance(&self) -> &E::Instance {
        &self.instance
    }

    pub fn input_names(&self) -> Vec<String> {
        self.instance.input_names()
    }

    pub fn output_names(&self) -> Vec<String> {
        self.instance.output_names()
    }
}
