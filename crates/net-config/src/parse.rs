//! Configuration dictionary normalization

use std::str::FromStr;

use tracing::debug;

use crate::{
    keys, ConfigDict, ConfigError, ConfigValue, DeviceType, NetworkConfig, NetworkType, Precision,
};

/// Build a [`NetworkConfig`] from a configuration dictionary.
///
/// Absent keys keep their defaults, except `device_type` which falls back to
/// CUDA. Every present key is type-checked; enum fields accept either the
/// typed value or one of its string spellings.
pub fn parse_network_config(dict: &ConfigDict) -> Result<NetworkConfig, ConfigError> {
    let mut config = NetworkConfig::default();

    config.device_type = match dict.get(keys::DEVICE_TYPE) {
        Some(value) => parse_device_type(value)?,
        None => DeviceType::Cuda,
    };
    if let Some(value) = dict.get(keys::DEVICE_ID) {
        config.device_id = parse_device_id(value)?;
    }
    if let Some(value) = dict.get(keys::DATA_FORMAT) {
        config.data_format = parse_enum(keys::DATA_FORMAT, "string or DataFormat", value, |v| {
            match v {
                ConfigValue::DataFormat(f) => Some(*f),
                _ => None,
            }
        })?;
    }
    if let Some(value) = dict.get(keys::NETWORK_TYPE) {
        config.network_type = parse_network_type(value)?;
    }
    if let Some(value) = dict.get(keys::SHARE_MEMORY_MODE) {
        config.share_memory_mode = parse_enum(
            keys::SHARE_MEMORY_MODE,
            "string or ShareMemoryMode",
            value,
            |v| match v {
                ConfigValue::ShareMemoryMode(m) => Some(*m),
                _ => None,
            },
        )?;
    }
    if let Some(value) = dict.get(keys::LIBRARY_PATH) {
        config.library_path = Some(parse_string(keys::LIBRARY_PATH, value)?);
    }
    if let Some(value) = dict.get(keys::PRECISION) {
        config.precision = parse_precision(value)?;
    }
    if let Some(value) = dict.get(keys::CACHE_PATH) {
        config.cache_path = Some(parse_string(keys::CACHE_PATH, value)?);
    }
    if let Some(value) = dict.get(keys::ENABLE_TUNE_KERNEL) {
        config.enable_tune_kernel = match value {
            ConfigValue::Bool(b) => *b,
            other => {
                return Err(ConfigError::type_mismatch(
                    keys::ENABLE_TUNE_KERNEL,
                    "bool",
                    other.type_name(),
                ))
            }
        };
    }

    for key in dict.keys().filter(|k| !keys::ALL.contains(&k.as_str())) {
        debug!("Ignoring unknown config key: {}", key);
    }

    Ok(config)
}

/// Parse a `device_type` value
pub fn parse_device_type(value: &ConfigValue) -> Result<DeviceType, ConfigError> {
    parse_enum(keys::DEVICE_TYPE, "string or DeviceType", value, |v| match v {
        ConfigValue::Device(d) => Some(*d),
        _ => None,
    })
}

/// Parse a `network_type` value
pub fn parse_network_type(value: &ConfigValue) -> Result<NetworkType, ConfigError> {
    parse_enum(keys::NETWORK_TYPE, "string or NetworkType", value, |v| match v {
        ConfigValue::Network(n) => Some(*n),
        _ => None,
    })
}

/// Parse a `precision` value
pub fn parse_precision(value: &ConfigValue) -> Result<Precision, ConfigError> {
    parse_enum(keys::PRECISION, "string or Precision", value, |v| match v {
        ConfigValue::Precision(p) => Some(*p),
        _ => None,
    })
}

fn parse_enum<T>(
    field: &'static str,
    expected: &'static str,
    value: &ConfigValue,
    typed: impl Fn(&ConfigValue) -> Option<T>,
) -> Result<T, ConfigError>
where
    T: FromStr<Err = ConfigError>,
{
    if let Some(v) = typed(value) {
        return Ok(v);
    }
    match value {
        ConfigValue::Str(s) => s.parse(),
        other => Err(ConfigError::type_mismatch(field, expected, other.type_name())),
    }
}

fn parse_device_id(value: &ConfigValue) -> Result<i32, ConfigError> {
    let id = value.as_int().ok_or_else(|| {
        ConfigError::type_mismatch(keys::DEVICE_ID, "int", value.type_name())
    })?;
    i32::try_from(id).map_err(|_| ConfigError::OutOfRange {
        field: keys::DEVICE_ID,
        value: id,
    })
}

fn parse_string(field: &'static str, value: &ConfigValue) -> Result<String, ConfigError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ConfigError::type_mismatch(field, "string", value.type_name()))
}
