//! YAML row extraction: mirrors the JSON rules — a top-level
//! sequence of mappings, or a single mapping wrapped into one row.

use ingest_core::model::{Row, Scalar};
use serde_yaml::Value;

use super::ExtractedRows;
use crate::error::ExtractError;

pub(super) fn extract(bytes: &[u8]) -> Result<ExtractedRows, ExtractError> {
    let value: Value = serde_yaml::from_slice(bytes)
    .map_err(|e| ExtractError::Malformed { format: "yaml", message: e.to_string() })?;

    let mappings: Vec<&serde_yaml::Mapping> = match &value {
        Value::Sequence(items) => items
        .iter()
        .map(|v| v.as_mapping().ok_or(ExtractError::UnsupportedYamlShape))
        .collect::<Result<_, _>>()?,
        Value::Mapping(m) => vec![m],
        _ => return Err(ExtractError::UnsupportedYamlShape),
    };

    let rows = mappings.into_iter().map(mapping_to_row).collect();
    Ok(ExtractedRows { rows, child_tables: Default::default() })
}

fn mapping_to_row(mapping: &serde_yaml::Mapping) -> Row {
    mapping
    .iter()
    .filter_map(|(k, v)| k.as_str().map(|key| (key.to_string(), scalar_from_yaml(v))))
    .collect()
}

fn scalar_from_yaml(value: &Value) -> Scalar {
    match value {
        Value::Null => Scalar::Null,
        Value::Bool(b) => Scalar::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Scalar::Int(i)
            } else if let Some(f) = n.as_f64() {
                Scalar::Real(f)
            } else {
                Scalar::Text(n.to_string())
            }
        }
        Value::String(s) => Scalar::Text(s.clone()),
        other => Scalar::Text(serde_yaml::to_string(other).unwrap_or_default()),
    }
}
