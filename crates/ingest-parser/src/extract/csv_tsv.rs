//! CSV/TSV row extraction: delimiter is inferred by a consistency
//! check over the first 10 non-empty lines rather than trusting the file
//! extension, since a `.csv` file tab-delimited in practice is common.

use ingest_core::model::{Row, Scalar};

use super::ExtractedRows;
use crate::error::ExtractError;

const SAMPLE_LINES: usize = 10;

pub(super) fn extract(bytes: &[u8]) -> Result<ExtractedRows, ExtractError> {
    let text = std::str::from_utf8(bytes)
    .map_err(|e| ExtractError::Malformed { format: "csv", message: e.to_string() })?;
    let delimiter = detect_delimiter(text)?;

    let mut reader = csv::ReaderBuilder::new()
    .delimiter(delimiter)
    .has_headers(true)
    .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
    .headers()
    .map_err(|e| ExtractError::Malformed { format: "csv", message: e.to_string() })?
    .iter()
    .map(str::to_string)
    .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ExtractError::Malformed { format: "csv", message: e.to_string() })?;
        let mut row: Row = Row::new();
        for (name, value) in headers.iter().zip(record.iter()) {
            row.insert(name.clone(), scalar_from_field(value));
        }
        rows.push(row);
    }

    Ok(ExtractedRows { rows, child_tables: Default::default() })
}

fn scalar_from_field(value: &str) -> Scalar {
    if value.is_empty() {
        Scalar::Null
    } else {
        Scalar::Text(value.to_string())
    }
}

/// Count fields per non-empty line under a candidate delimiter; consistent
/// iff every sampled line has the same field count.
fn field_count(line: &str, delimiter: char) -> usize {
    line.split(delimiter).count()
}

fn is_consistent(text: &str, delimiter: char) -> bool {
    let mut counts = text.lines().filter(|l| !l.trim().is_empty()).take(SAMPLE_LINES).map(|l| field_count(l, delimiter));
    let Some(first) = counts.next() else { return false };
    first > 1 && counts.all(|c| c == first)
}

fn detect_delimiter(text: &str) -> Result<u8, ExtractError> {
    if is_consistent(text, ',') {
        Ok(b',')
    } else if is_consistent(text, '\t') {
        Ok(b'\t')
    } else {
        Err(ExtractError::InconsistentDelimiter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_comma_delimiter() {
        let text = "a,b,c\n1,2,3\n4,5,6\n";
        let extracted = extract(text.as_bytes()).unwrap();
        assert_eq!(extracted.rows.len(), 2);
        assert_eq!(extracted.rows[0].get("a"), Some(&Scalar::Text("1".into())));
    }

    #[test]
    fn detects_tab_delimiter() {
        let text = "a\tb\tc\n1\t2\t3\n4\t5\t6\n";
        let extracted = extract(text.as_bytes()).unwrap();
        assert_eq!(extracted.rows.len(), 2);
    }

    #[test]
    fn rejects_inconsistent_field_counts() {
        let text = "a,b,c\n1,2\n3,4,5\n";
        let err = extract(text.as_bytes()).unwrap_err();
        assert!(matches!(err, ExtractError::InconsistentDelimiter));
    }

    #[test]
    fn empty_fields_become_null() {
        let text = "a,b\n1,\n";
        let extracted = extract(text.as_bytes()).unwrap();
        assert_eq!(extracted.rows[0].get("b"), Some(&Scalar::Null));
    }
}
