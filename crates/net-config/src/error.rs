//! Configuration Error Types

use thiserror::Error;

/// Errors while normalizing a configuration dictionary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Value has the wrong type for its field
    #[error("{field} must be of type {expected}, but got: {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// String does not name any supported variant
    #[error("Got a {field} unsupported (value: {value})")]
    UnsupportedValue { field: &'static str, value: String },

    /// Range specification lacks one of its bounds
    #[error(
        "Input size {index} is a range but has no `{key}` bound; \
         a range must provide both min and max"
    )]
    MissingRangeKey { index: usize, key: &'static str },

    /// Integer does not fit the target field
    #[error("{field} value {value} is out of range")]
    OutOfRange { field: &'static str, value: i64 },
}

impl ConfigError {
    pub(crate) fn type_mismatch(
        field: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        ConfigError::TypeMismatch {
            field: field.into(),
            expected,
            found,
        }
    }

    pub(crate) fn unsupported(field: &'static str, value: &str) -> Self {
        ConfigError::UnsupportedValue {
            field,
            value: value.to_string(),
        }
    }

    /// Whether this is a type error rather than a bad value
    pub fn is_type_error(&self) -> bool {
        matches!(self, ConfigError::TypeMismatch { .. })
    }
}
