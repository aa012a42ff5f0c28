//! End-to-end loading and forward passes against the mock engine

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use inference_engine::mock::{CreationKind, MockEngine};
use inference_engine::EngineError;
use model_loader::{
    load, load_raw, load_raw_range, ForwardError, ForwardInputs, LoadError, OutputMode, Outputs,
};
use ndarray::{ArrayD, IxDyn};
use net_config::{
    ConfigDict, ConfigError, ConfigValue, DeviceType, InputShapesMap, ModelParams, ModelType,
    NetworkConfig, NetworkType, Precision,
};
use tempfile::TempDir;

fn write_tnn_model(dir: &Path, stem: &str) -> PathBuf {
    let proto = dir.join(format!("{stem}.tnnproto"));
    let weights = dir.join(format!("{stem}.tnnmodel"));
    fs::write(&proto, "\"1 2 1 4206624770 ,\"\n").unwrap();
    fs::write(&weights, [0xfa, 0xbc, 0x00, 0x01]).unwrap();
    proto
}

fn write_graph_model(dir: &Path) -> PathBuf {
    let path = dir.join("model.ts");
    fs::write(&path, b"serialized graph").unwrap();
    path
}

fn dict(entries: Vec<(&str, ConfigValue)>) -> ConfigDict {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn tensor(dims: &[usize], value: f32) -> ArrayD<f32> {
    ArrayD::from_elem(IxDyn(dims), value)
}

fn range(min: Vec<i64>, max: Vec<i64>) -> ConfigValue {
    ConfigValue::Map(dict(vec![("min", min.into()), ("max", max.into())]))
}

#[test]
fn test_tnn_model_reads_descriptor_and_weights() {
    let dir = TempDir::new().unwrap();
    let proto = write_tnn_model(dir.path(), "model");

    let module = load(MockEngine::new(), &proto, &ConfigDict::new()).unwrap();

    assert_eq!(module.model_type(), ModelType::Tnn);
    let model = module.engine().model().unwrap();
    match &model.params {
        ModelParams::Tnn { proto, weights } => {
            assert!(proto.starts_with("\"1 2 1"));
            assert_eq!(weights, &vec![0xfa, 0xbc, 0x00, 0x01]);
        }
        other => panic!("unexpected params {other:?}"),
    }
}

#[test]
fn test_weights_path_replaces_only_last_suffix() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("tnnproto");
    fs::create_dir(&nested).unwrap();
    let proto = write_tnn_model(&nested, "model");

    let module = load(MockEngine::new(), &proto, &ConfigDict::new()).unwrap();
    assert_eq!(module.model_type(), ModelType::Tnn);
}

#[test]
fn test_missing_weights_is_io_error() {
    let dir = TempDir::new().unwrap();
    let proto = write_tnn_model(dir.path(), "model");
    let weights = dir.path().join("model.tnnmodel");
    fs::remove_file(&weights).unwrap();

    let err = load(MockEngine::new(), &proto, &ConfigDict::new())
        .err()
        .unwrap();
    match err {
        LoadError::Io { path, .. } => assert_eq!(path, weights),
        other => panic!("expected io error, got {other}"),
    }
}

#[test]
fn test_missing_descriptor_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = load(
        MockEngine::new(),
        dir.path().join("absent.tnnproto"),
        &ConfigDict::new(),
    )
    .err()
    .unwrap();
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn test_config_validated_before_touching_disk() {
    let dir = TempDir::new().unwrap();
    let config = dict(vec![("device_type", "tpu".into())]);

    let err = load(MockEngine::new(), dir.path().join("absent.tnnproto"), &config)
        .err()
        .unwrap();
    assert!(matches!(
        err,
        LoadError::Config(ConfigError::UnsupportedValue { field: "device_type", .. })
    ));
}

#[test]
fn test_bad_range_is_config_error() {
    let dir = TempDir::new().unwrap();
    let proto = write_tnn_model(dir.path(), "model");
    let config = dict(vec![(
        "input_shapes",
        ConfigValue::List(vec![ConfigValue::Map(dict(vec![("min", vec![1i64].into())]))]),
    )]);

    let err = load(MockEngine::new(), &proto, &config).err().unwrap();
    assert!(matches!(
        err,
        LoadError::Config(ConfigError::MissingRangeKey { index: 0, key: "max" })
    ));
}

#[test]
fn test_engine_rejection_propagates() {
    let dir = TempDir::new().unwrap();
    let proto = write_tnn_model(dir.path(), "model");

    let err = load(MockEngine::rejecting("invalid proto"), &proto, &ConfigDict::new())
        .err()
        .unwrap();
    assert!(matches!(
        err,
        LoadError::Engine(EngineError::ModelLoadError(ref m)) if m == "invalid proto"
    ));
}

#[test]
fn test_graph_model_forces_tnntorch_backend() {
    let dir = TempDir::new().unwrap();
    let path = write_graph_model(dir.path());
    let config = dict(vec![
        ("network_type", "tensorrt".into()),
        ("precision", "fp32".into()),
    ]);

    let module = load(MockEngine::new(), &path, &config).unwrap();

    assert_eq!(module.model_type(), ModelType::TorchScript);
    assert_eq!(module.network_config().network_type, NetworkType::TnnTorch);
    assert_eq!(module.network_config().precision, Precision::High);
    assert_eq!(
        module.instance().network_config().network_type,
        NetworkType::TnnTorch
    );
    match &module.engine().model().unwrap().params {
        ModelParams::TorchScript { path: passed } => assert_eq!(passed, &path),
        other => panic!("unexpected params {other:?}"),
    }
}

#[test]
fn test_tnn_model_keeps_requested_backend() {
    let dir = TempDir::new().unwrap();
    let proto = write_tnn_model(dir.path(), "model");
    let config = dict(vec![("network_type", "OPENVINO".into())]);

    let module = load(MockEngine::new(), &proto, &config).unwrap();
    assert_eq!(module.network_config().network_type, NetworkType::OpenVino);
}

#[test]
fn test_defaults_to_cuda() {
    let dir = TempDir::new().unwrap();
    let proto = write_tnn_model(dir.path(), "model");

    let from_dict = load(MockEngine::new(), &proto, &ConfigDict::new()).unwrap();
    assert_eq!(from_dict.network_config().device_type, DeviceType::Cuda);

    let from_raw = load_raw(MockEngine::new(), &proto, None, None).unwrap();
    assert_eq!(from_raw.network_config().device_type, DeviceType::Cuda);
}

#[test]
fn test_creation_dispatch() {
    let dir = TempDir::new().unwrap();
    let proto = write_tnn_model(dir.path(), "model");
    let shapes = InputShapesMap::from([("input_0".to_string(), vec![1, 3, 8, 8])]);
    let max = InputShapesMap::from([("input_0".to_string(), vec![4, 3, 8, 8])]);

    let plain = load(MockEngine::new(), &proto, &ConfigDict::new()).unwrap();
    assert_eq!(plain.instance().creation(), CreationKind::Plain);

    let fixed =
        load_raw_range(MockEngine::new(), &proto, None, Some(shapes.clone()), None).unwrap();
    assert_eq!(fixed.instance().creation(), CreationKind::FixedShapes);

    let raw = load_raw(MockEngine::new(), &proto, None, Some(shapes.clone())).unwrap();
    assert_eq!(raw.instance().creation(), CreationKind::ShapeRange);
    assert_eq!(raw.instance().min_shapes(), raw.instance().max_shapes());

    let ranged =
        load_raw_range(MockEngine::new(), &proto, None, Some(shapes.clone()), Some(max.clone()))
            .unwrap();
    assert_eq!(ranged.instance().creation(), CreationKind::ShapeRange);
    assert_eq!(ranged.instance().min_shapes(), Some(&shapes));
    assert_eq!(ranged.instance().max_shapes(), Some(&max));

    let max_only = load_raw_range(MockEngine::new(), &proto, None, None, Some(max)).unwrap();
    assert_eq!(max_only.instance().creation(), CreationKind::Plain);
}

#[test]
fn test_input_shapes_from_dict() {
    let dir = TempDir::new().unwrap();
    let proto = write_tnn_model(dir.path(), "model");
    let config = dict(vec![(
        "input_shapes",
        ConfigValue::List(vec![
            range(vec![1, 3, 224, 224], vec![8, 3, 224, 224]),
            vec![1i64, 10].into(),
        ]),
    )]);

    let module = load(MockEngine::new(), &proto, &config).unwrap();
    let instance = module.instance();
    assert_eq!(instance.creation(), CreationKind::ShapeRange);
    assert_eq!(instance.min_shapes().unwrap()["input_0"], vec![1, 3, 224, 224]);
    assert_eq!(instance.max_shapes().unwrap()["input_0"], vec![8, 3, 224, 224]);
    assert_eq!(instance.min_shapes().unwrap()["input_1"], vec![1, 10]);
    assert_eq!(instance.max_shapes().unwrap()["input_1"], vec![1, 10]);
}

#[test]
fn test_three_positional_inputs() {
    let dir = TempDir::new().unwrap();
    let proto = write_tnn_model(dir.path(), "model");
    let engine = MockEngine::new().with_output_scale(2.0);
    let mut module = load(engine, &proto, &ConfigDict::new()).unwrap();

    let inputs = ForwardInputs::positional([
        tensor(&[1, 2], 1.0),
        tensor(&[1, 3], 2.0),
        tensor(&[1, 4], 3.0),
    ]);
    let outputs = module.forward(inputs, OutputMode::List).unwrap();

    assert_eq!(
        module.instance().bind_order(),
        &["input_0".to_string(), "input_1".to_string(), "input_2".to_string()]
    );
    let list = outputs.into_list().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0], tensor(&[1, 2], 2.0));
    assert_eq!(list[1], tensor(&[1, 3], 4.0));
    assert_eq!(list[2], tensor(&[1, 4], 6.0));
}

#[test]
fn test_dict_output_mode() {
    let dir = TempDir::new().unwrap();
    let proto = write_tnn_model(dir.path(), "model");
    let mut module = load(MockEngine::new(), &proto, &ConfigDict::new()).unwrap();

    let outputs = module
        .forward_with_flag(vec![tensor(&[2], 1.0), tensor(&[2], 5.0)], "dict")
        .unwrap();

    assert_eq!(outputs.get("input_1_out"), Some(&tensor(&[2], 5.0)));
    let names = outputs
        .into_dict()
        .unwrap()
        .into_iter()
        .map(|(name, _)| name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["input_0_out".to_string(), "input_1_out".to_string()]);
}

#[test]
fn test_dict_outputs_follow_engine_order() {
    let dir = TempDir::new().unwrap();
    let proto = write_tnn_model(dir.path(), "model");
    let mut module = load(MockEngine::new(), &proto, &ConfigDict::new()).unwrap();

    let inputs = vec![
        ("zeta".to_string(), tensor(&[1], 1.0)),
        ("alpha".to_string(), tensor(&[1], 2.0)),
    ];
    let outputs = module.forward(inputs, OutputMode::Dict).unwrap();

    assert_eq!(
        module.output_names(),
        vec!["zeta_out".to_string(), "alpha_out".to_string()]
    );
    let names = outputs
        .into_dict()
        .unwrap()
        .into_iter()
        .map(|(name, _)| name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["zeta_out".to_string(), "alpha_out".to_string()]);
}

#[test]
fn test_unknown_flag_falls_back_to_list() {
    let dir = TempDir::new().unwrap();
    let proto = write_tnn_model(dir.path(), "model");
    let mut module = load(MockEngine::new(), &proto, &ConfigDict::new()).unwrap();

    let outputs = module.forward_with_flag(tensor(&[1], 1.0), "tuple").unwrap();
    assert!(matches!(outputs, Outputs::List(ref v) if v.len() == 1));
}

#[test]
fn test_named_inputs_keep_names() {
    let dir = TempDir::new().unwrap();
    let proto = write_tnn_model(dir.path(), "model");
    let mut module = load(MockEngine::new(), &proto, &ConfigDict::new()).unwrap();

    let inputs = BTreeMap::from([
        ("image".to_string(), tensor(&[1, 3, 2, 2], 0.5)),
        ("mask".to_string(), tensor(&[1, 1, 2, 2], 1.0)),
    ]);
    let outputs = module.forward(inputs, OutputMode::Dict).unwrap();

    assert!(module.instance().bound_input("image").is_some());
    assert!(module.instance().bound_input("mask").is_some());
    assert!(module.instance().bound_input("input_0").is_none());
    assert_eq!(outputs.len(), 2);
}

#[test]
fn test_single_tensor_binds_default_input() {
    let dir = TempDir::new().unwrap();
    let proto = write_tnn_model(dir.path(), "model");
    let engine = MockEngine::with_inputs(&["data", "extra"]);
    let mut module = load(engine, &proto, &ConfigDict::new()).unwrap();

    module.forward(tensor(&[1, 4], 1.0), OutputMode::List).unwrap();

    assert_eq!(module.instance().bind_order(), &["data".to_string()]);
    assert_eq!(module.input_names(), vec!["data".to_string(), "extra".to_string()]);
    assert_eq!(module.output_names(), vec!["data_out".to_string()]);
}

#[test]
fn test_single_element_list_is_positional() {
    let dir = TempDir::new().unwrap();
    let proto = write_tnn_model(dir.path(), "model");
    let engine = MockEngine::with_inputs(&["data"]);
    let mut module = load(engine, &proto, &ConfigDict::new()).unwrap();

    module
        .forward(vec![tensor(&[1], 1.0)], OutputMode::List)
        .unwrap();
    assert_eq!(module.instance().bind_order(), &["input_0".to_string()]);
}

#[test]
fn test_empty_inputs_rejected() {
    let dir = TempDir::new().unwrap();
    let proto = write_tnn_model(dir.path(), "model");
    let mut module = load(MockEngine::new(), &proto, &ConfigDict::new()).unwrap();

    let err = module
        .forward(Vec::<ArrayD<f32>>::new(), OutputMode::List)
        .unwrap_err();
    assert!(matches!(err, ForwardError::NoInputs));
    assert_eq!(module.instance().forward_count(), 0);
}

#[test]
fn test_shape_outside_range_is_engine_error() {
    let dir = TempDir::new().unwrap();
    let proto = write_tnn_model(dir.path(), "model");
    let config = dict(vec![(
        "input_shapes",
        ConfigValue::List(vec![range(vec![1, 3], vec![4, 3])]),
    )]);
    let mut module = load(MockEngine::new(), &proto, &config).unwrap();

    assert!(module.forward(vec![tensor(&[2, 3], 0.0)], OutputMode::List).is_ok());
    let err = module
        .forward(vec![tensor(&[9, 3], 0.0)], OutputMode::List)
        .unwrap_err();
    assert!(matches!(
        err,
        ForwardError::Engine(EngineError::InvalidInputShape { .. })
    ));
}

#[test]
fn test_forward_failure_propagates() {
    let dir = TempDir::new().unwrap();
    let proto = write_tnn_model(dir.path(), "model");
    let engine = MockEngine::new().failing_forward();
    let mut module = load(engine, &proto, &ConfigDict::new()).unwrap();

    let err = module.forward(tensor(&[1], 1.0), OutputMode::List).unwrap_err();
    assert!(matches!(err, ForwardError::Engine(EngineError::InferenceFailed(_))));
}

#[test]
fn test_raw_config_is_used_verbatim() {
    let dir = TempDir::new().unwrap();
    let proto = write_tnn_model(dir.path(), "model");
    let config = NetworkConfig {
        device_type: DeviceType::Arm,
        enable_tune_kernel: true,
        ..Default::default()
    };

    let module = load_raw(MockEngine::new(), &proto, Some(config.clone()), None).unwrap();
    assert_eq!(module.network_config(), &config);
    assert_eq!(module.model_path(), proto.as_path());
}
