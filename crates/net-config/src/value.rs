//! Loosely-typed configuration values

use std::collections::BTreeMap;

use crate::{DataFormat, DeviceType, NetworkType, Precision, ShareMemoryMode};

/// Configuration dictionary keyed by option name
pub type ConfigDict = BTreeMap<String, ConfigValue>;

/// A single value in a configuration dictionary
///
/// Besides the plain scalar and container shapes, a value may carry an
/// already-typed engine enum, which the normalizer passes through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ConfigValue>),
    Map(ConfigDict),
    Device(DeviceType),
    Network(NetworkType),
    Precision(Precision),
    DataFormat(DataFormat),
    ShareMemoryMode(ShareMemoryMode),
}

impl ConfigValue {
    /// Name of the value's type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Int(_) => "int",
            ConfigValue::Float(_) => "float",
            ConfigValue::Str(_) => "string",
            ConfigValue::List(_) => "list",
            ConfigValue::Map(_) => "map",
            ConfigValue::Device(_) => "DeviceType",
            ConfigValue::Network(_) => "NetworkType",
            ConfigValue::Precision(_) => "Precision",
            ConfigValue::DataFormat(_) => "DataFormat",
            ConfigValue::ShareMemoryMode(_) => "ShareMemoryMode",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Int(v)
    }
}

impl From<i32> for ConfigValue {
    fn from(v: i32) -> Self {
        ConfigValue::Int(v.into())
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Float(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::Str(v.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::Str(v)
    }
}

impl<T: Into<ConfigValue>> From<Vec<T>> for ConfigValue {
    fn from(v: Vec<T>) -> Self {
        ConfigValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<ConfigDict> for ConfigValue {
    fn from(v: ConfigDict) -> Self {
        ConfigValue::Map(v)
    }
}

impl From<DeviceType> for ConfigValue {
    fn from(v: DeviceType) -> Self {
        ConfigValue::Device(v)
    }
}

impl From<NetworkType> for ConfigValue {
    fn from(v: NetworkType) -> Self {
        ConfigValue::Network(v)
    }
}

impl From<Precision> for ConfigValue {
    fn from(v: Precision) -> Self {
        ConfigValue::Precision(v)
    }
}

impl From<DataFormat> for ConfigValue {
    fn from(v: DataFormat) -> Self {
        ConfigValue::DataFormat(v)
    }
}

impl From<ShareMemoryMode> for ConfigValue {
    fn from(v: ShareMemoryMode) -> Self {
        ConfigValue::ShareMemoryMode(v)
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value;
        match v {
            Value::Null => ConfigValue::Null,
            Value::Bool(b) => ConfigValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ConfigValue::Int(i),
                None => ConfigValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => ConfigValue::Str(s),
            Value::Array(items) => ConfigValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                ConfigValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_object() {
        let value = ConfigValue::from(json!({
            "device_type": "cpu",
            "device_id": 1,
            "enable_tune_kernel": true,
            "input_shapes": [[1, 3, 224, 224], {"min": [1, 3], "max": [8, 3]}],
        }));

        let ConfigValue::Map(dict) = value else {
            panic!("expected a map");
        };
        assert_eq!(dict["device_type"], ConfigValue::Str("cpu".into()));
        assert_eq!(dict["device_id"], ConfigValue::Int(1));
        assert_eq!(dict["enable_tune_kernel"], ConfigValue::Bool(true));
        assert!(matches!(&dict["input_shapes"], ConfigValue::List(items) if items.len() == 2));
    }

    #[test]
    fn test_float_numbers_stay_floats() {
        assert_eq!(ConfigValue::from(json!(1.5)), ConfigValue::Float(1.5));
        assert_eq!(ConfigValue::from(json!(2)).type_name(), "int");
    }

    #[test]
    fn test_vec_conversion() {
        let value = ConfigValue::from(vec![1i64, 3, 224]);
        assert_eq!(
            value,
            ConfigValue::List(vec![
                ConfigValue::Int(1),
                ConfigValue::Int(3),
                ConfigValue::Int(224)
            ])
        );
    }
}
