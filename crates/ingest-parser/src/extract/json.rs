//! JSON row extraction: accept a top-level array of objects, or a
//! single object wrapped into a one-row sequence.

use ingest_core::model::{Row, Scalar};
use serde_json::Value;

use super::ExtractedRows;
use crate::error::ExtractError;

pub(super) fn extract(bytes: &[u8]) -> Result<ExtractedRows, ExtractError> {
    let value: Value = serde_json::from_slice(bytes)
    .map_err(|e| ExtractError::Malformed { format: "json", message: e.to_string() })?;

    let objects: Vec<&serde_json::Map<String, Value>> = match &value {
        Value::Array(items) => items
        .iter()
        .map(|v| v.as_object().ok_or(ExtractError::UnsupportedJsonShape))
        .collect::<Result<_, _>>()?,
        Value::Object(obj) => vec![obj],
        _ => return Err(ExtractError::UnsupportedJsonShape),
    };

    let rows = objects.into_iter().map(object_to_row).collect();
    Ok(ExtractedRows { rows, child_tables: Default::default() })
}

fn object_to_row(obj: &serde_json::Map<String, Value>) -> Row {
    obj.iter().map(|(k, v)| (k.clone(), Scalar::from_json(v))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_of_objects() {
        let bytes = br#"[{"a":1},{"a":2}]"#;
        let extracted = extract(bytes).unwrap();
        assert_eq!(extracted.rows.len(), 2);
        assert_eq!(extracted.rows[0].get("a"), Some(&Scalar::Int(1)));
    }

    #[test]
    fn single_object_wrapped() {
        let bytes = br#"{"a":1,"b":"x"}"#;
        let extracted = extract(bytes).unwrap();
        assert_eq!(extracted.rows.len(), 1);
    }

    #[test]
    fn scalar_top_level_rejected() {
        let err = extract(b"42").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedJsonShape));
    }

    #[test]
    fn array_of_scalars_rejected() {
        let err = extract(b"[1,2,3]").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedJsonShape));
    }
}
