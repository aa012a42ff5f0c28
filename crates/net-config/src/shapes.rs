//! Input shape bounds

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{keys, ConfigError, ConfigValue};

/// Tensor dimensions, outermost first
pub type Dims = Vec<i64>;

/// Shapes keyed by input name
pub type InputShapesMap = BTreeMap<String, Dims>;

/// Shape specification for one input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShapeSpec {
    /// Static shape, used as both bounds
    Fixed(Dims),
    /// Dynamic shape between two bounds
    Range { min: Dims, max: Dims },
}

/// Positional input name
pub fn input_name(index: usize) -> String {
    format!("input_{index}")
}

/// Parse the `input_shapes` option into `(min, max)` shape maps.
///
/// Every element is type-checked before any range is inspected, so a
/// malformed element anywhere in the list is reported as a type error.
pub fn parse_input_ranges(
    value: &ConfigValue,
) -> Result<(InputShapesMap, InputShapesMap), ConfigError> {
    let specs = shape_specs_from_value(value)?;
    Ok(parse_shape_specs(&specs))
}

/// Convert typed shape specifications into `(min, max)` shape maps
pub fn parse_shape_specs(specs: &[ShapeSpec]) -> (InputShapesMap, InputShapesMap) {
    let mut min_shapes = InputShapesMap::new();
    let mut max_shapes = InputShapesMap::new();

    for (index, spec) in specs.iter().enumerate() {
        let (min, max) = match spec {
            ShapeSpec::Fixed(dims) => (dims.clone(), dims.clone()),
            ShapeSpec::Range { min, max } => (min.clone(), max.clone()),
        };
        min_shapes.insert(input_name(index), min);
        max_shapes.insert(input_name(index), max);
    }

    (min_shapes, max_shapes)
}

/// Read shape specifications out of a loosely-typed list
pub fn shape_specs_from_value(value: &ConfigValue) -> Result<Vec<ShapeSpec>, ConfigError> {
    let items = match value {
        ConfigValue::List(items) => items,
        other => {
            return Err(ConfigError::type_mismatch(
                keys::INPUT_SHAPES,
                "list",
                other.type_name(),
            ))
        }
    };

    if let Some((index, bad)) = items
        .iter()
        .enumerate()
        .find(|(_, item)| !matches!(item, ConfigValue::List(_) | ConfigValue::Map(_)))
    {
        return Err(ConfigError::type_mismatch(
            format!("{}[{index}]", keys::INPUT_SHAPES),
            "list of ints or {min, max} map",
            bad.type_name(),
        ));
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            ConfigValue::Map(range) => {
                let bound = |key: &'static str| {
                    range
                        .get(key)
                        .ok_or(ConfigError::MissingRangeKey { index, key })
                        .and_then(|v| {
                            let field = format!("{}[{index}].{key}", keys::INPUT_SHAPES);
                            dims_from_value(&field, v)
                        })
                };
                let min = bound("min")?;
                let max = bound("max")?;
                Ok(ShapeSpec::Range { min, max })
            }
            other => dims_from_value(&format!("{}[{index}]", keys::INPUT_SHAPES), other)
                .map(ShapeSpec::Fixed),
        })
        .collect()
}

fn dims_from_value(field: &str, value: &ConfigValue) -> Result<Dims, ConfigError> {
    let ConfigValue::List(items) = value else {
        return Err(ConfigError::type_mismatch(field, "list of ints", value.type_name()));
    };
    items
        .iter()
        .map(|dim| {
            dim.as_int()
                .ok_or_else(|| ConfigError::type_mismatch(field, "list of ints", dim.type_name()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigDict;
    use proptest::prelude::*;

    fn range(min: Vec<i64>, max: Vec<i64>) -> ConfigValue {
        let mut map = ConfigDict::new();
        map.insert("min".into(), min.into());
        map.insert("max".into(), max.into());
        ConfigValue::Map(map)
    }

    #[test]
    fn test_range_bounds() {
        let value = ConfigValue::List(vec![range(vec![1, 3, 224, 224], vec![8, 3, 224, 224])]);
        let (min, max) = parse_input_ranges(&value).unwrap();
        assert_eq!(min["input_0"], vec![1, 3, 224, 224]);
        assert_eq!(max["input_0"], vec![8, 3, 224, 224]);
    }

    #[test]
    fn test_mixed_fixed_and_range() {
        let value = ConfigValue::List(vec![
            vec![1i64, 3, 32, 32].into(),
            range(vec![1, 10], vec![4, 10]),
        ]);
        let (min, max) = parse_input_ranges(&value).unwrap();
        assert_eq!(min["input_0"], max["input_0"]);
        assert_eq!(min["input_1"], vec![1, 10]);
        assert_eq!(max["input_1"], vec![4, 10]);
    }

    #[test]
    fn test_missing_max_fails() {
        let mut map = ConfigDict::new();
        map.insert("min".into(), vec![1i64, 3].into());
        let value = ConfigValue::List(vec![vec![1i64].into(), ConfigValue::Map(map)]);

        let err = parse_input_ranges(&value).unwrap_err();
        assert_eq!(err, ConfigError::MissingRangeKey { index: 1, key: "max" });
    }

    #[test]
    fn test_missing_min_fails() {
        let mut map = ConfigDict::new();
        map.insert("max".into(), vec![1i64, 3].into());
        let err = parse_input_ranges(&ConfigValue::List(vec![ConfigValue::Map(map)])).unwrap_err();
        assert_eq!(err, ConfigError::MissingRangeKey { index: 0, key: "min" });
    }

    #[test]
    fn test_bad_element_is_type_error() {
        let value = ConfigValue::List(vec![vec![1i64].into(), "1x3x224x224".into()]);
        let err = parse_input_ranges(&value).unwrap_err();
        assert!(err.is_type_error());
        assert!(err.to_string().contains("input_shapes[1]"));
    }

    #[test]
    fn test_type_checked_before_ranges() {
        let value =
            ConfigValue::List(vec![ConfigValue::Map(ConfigDict::new()), ConfigValue::Int(3)]);
        assert!(parse_input_ranges(&value).unwrap_err().is_type_error());
    }

    #[test]
    fn test_non_integer_dims_rejected() {
        let value = ConfigValue::List(vec![ConfigValue::List(vec![ConfigValue::Float(1.0)])]);
        assert!(parse_input_ranges(&value).unwrap_err().is_type_error());
    }

    #[test]
    fn test_not_a_list() {
        assert!(parse_input_ranges(&ConfigValue::Int(1)).unwrap_err().is_type_error());
    }

    #[test]
    fn test_shape_spec_deserialize() {
        let specs: Vec<ShapeSpec> =
            serde_json::from_str(r#"[[1, 3], {"min": [1, 2], "max": [4, 2]}]"#).unwrap();
        assert_eq!(specs[0], ShapeSpec::Fixed(vec![1, 3]));
        assert_eq!(
            specs[1],
            ShapeSpec::Range {
                min: vec![1, 2],
                max: vec![4, 2]
            }
        );
    }

    proptest! {
        #[test]
        fn fixed_shapes_fill_both_maps(
            shapes in proptest::collection::vec(proptest::collection::vec(1i64..512, 1..5), 0..8)
        ) {
            let value = ConfigValue::List(shapes.iter().cloned().map(ConfigValue::from).collect());
            let (min, max) = parse_input_ranges(&value).unwrap();

            prop_assert_eq!(&min, &max);
            prop_assert_eq!(min.len(), shapes.len());
            for (index, shape) in shapes.iter().enumerate() {
                prop_assert_eq!(&min[&input_name(index)], shape);
            }
        }
    }
}
