//! Engine capability interface

use net_config::{DeviceType, InputShapesMap, ModelConfig, NetworkConfig};

use crate::{EngineError, Mat, MatConvertParam, MatType};

/// A model-holding inference engine.
///
/// Instance creation is overloaded on how many shape maps are known: none,
/// one fixed map, or a min/max pair. Each arity is its own entry point so
/// callers dispatch explicitly.
pub trait Engine {
    type Instance: Instance;

    /// Load a model into the engine
    fn init(&mut self, config: &ModelConfig) -> Result<(), EngineError>;

    /// Create an instance with the model's own input shapes
    fn create_instance(&self, config: &NetworkConfig) -> Result<Self::Instance, EngineError>;

    /// Create an instance with fixed input shapes
    fn create_instance_with_shapes(
        &self,
        config: &NetworkConfig,
        shapes: &InputShapesMap,
    ) -> Result<Self::Instance, EngineError>;

    /// Create an instance whose inputs may vary between two bounds
    fn create_instance_with_range(
        &self,
        config: &NetworkConfig,
        min_shapes: &InputShapesMap,
        max_shapes: &InputShapesMap,
    ) -> Result<Self::Instance, EngineError>;
}

/// A runnable instance of a loaded model
pub trait Instance {
    /// Bind a tensor to an input; `None` binds the engine's default input
    fn set_input_mat(
        &mut self,
        mat: Mat,
        param: &MatConvertParam,
        name: Option<&str>,
    ) -> Result<(), EngineError>;

    /// Run the whole graph; blocks until done
    fn forward(&mut self) -> Result<(), EngineError>;

    /// Declared input names
    fn input_names(&self) -> Vec<String>;

    /// Output blob names, in the engine's order
    fn output_names(&self) -> Vec<String>;

    /// Copy an output blob out as a mat on the given device and layout
    fn get_output_mat(
        &self,
        param: &MatConvertParam,
        name: &str,
        device_type: DeviceType,
        mat_type: MatType,
    ) -> Result<Mat, EngineError>;
}
