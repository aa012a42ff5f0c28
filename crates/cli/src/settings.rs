//! Load configuration from file and environment

use std::path::Path;

use anyhow::{bail, Result};
use net_config::{ConfigDict, ConfigValue};
use tracing::debug;

/// Environment variables with this prefix override file settings
pub const ENV_PREFIX: &str = "TNN";

/// Read the load configuration dictionary.
///
/// File values come first; `TNN_<KEY>` environment variables override them.
pub fn load_config_dict(path: Option<&Path>) -> Result<ConfigDict> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        debug!("Reading load config from {}", path.display());
        builder = builder.add_source(config::File::from(path).required(true));
    }
    let settings = builder
        .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()?;

    let value: serde_json::Value = settings.try_deserialize()?;
    match ConfigValue::from(value) {
        ConfigValue::Map(dict) => Ok(dict),
        ConfigValue::Null => Ok(ConfigDict::new()),
        other => bail!("load config must be a table, got {}", other.type_name()),
    }
}
