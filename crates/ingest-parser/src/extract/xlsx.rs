//! XLSX row extraction: first sheet, header row required.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use ingest_core::model::{Row, Scalar};

use super::ExtractedRows;
use crate::error::ExtractError;

pub(super) fn extract(bytes: &[u8]) -> Result<ExtractedRows, ExtractError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
    .map_err(|e| ExtractError::Malformed { format: "xlsx", message: e.to_string() })?;

    let sheet_name = workbook
    .sheet_names()
    .first()
    .cloned()
    .ok_or(ExtractError::MissingXlsxHeader)?;

    let range = workbook
    .worksheet_range(&sheet_name)
    .map_err(|e| ExtractError::Malformed { format: "xlsx", message: e.to_string() })?;

    let mut rows_iter = range.rows();
    let header_row = rows_iter.next().ok_or(ExtractError::MissingXlsxHeader)?;
    let headers: Vec<String> = header_row.iter().map(data_to_string).collect();
    if headers.iter().all(String::is_empty) {
        return Err(ExtractError::MissingXlsxHeader);
    }

    let mut rows = Vec::new();
    for record in rows_iter {
        let mut row: Row = Row::new();
        for (name, cell) in headers.iter().zip(record.iter()) {
            row.insert(name.clone(), scalar_from_data(cell));
        }
        rows.push(row);
    }

    Ok(ExtractedRows { rows, child_tables: Default::default() })
}

fn data_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn scalar_from_data(cell: &Data) -> Scalar {
    match cell {
        Data::Empty => Scalar::Null,
        Data::String(s) => Scalar::Text(s.clone()),
        Data::Float(f) => Scalar::Real(*f),
        Data::Int(i) => Scalar::Int(*i),
        Data::Bool(b) => Scalar::Bool(*b),
        Data::DateTime(dt) => Scalar::Text(dt.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Scalar::Text(s.clone()),
        Data::Error(e) => Scalar::Text(format!("{e:?}")),
    }
}
