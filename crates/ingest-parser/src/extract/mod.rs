//! RowExtractor: one submodule per structured format.
//!
//! Each submodule produces a lazy-in-spirit (collected here, since files are
//! bounded and single-writer) sequence of [`Row`]s. `error` is populated iff
//! the input was malformed for its declared type; there is no partial
//! success for a single file.

mod csv_tsv;
mod html;
mod json;
mod xlsx;
mod xml;
mod yaml;

use std::collections::BTreeMap;

use ingest_core::model::Row;

use crate::detect::DetectedType;
use crate::error::ExtractError;

/// The result of extracting rows from one file.
///
/// `child_tables` holds deeply-nested content pulled out of the primary rows
/// during XML extraction, keyed by the child table's synthesized
/// name; every row in a child table carries a `parent_id` column.
#[derive(Debug, Clone, Default)]
pub struct ExtractedRows {
    pub rows: Vec<Row>,
    pub child_tables: BTreeMap<String, Vec<Row>>,
}

impl ExtractedRows {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Extract rows from `bytes`, dispatching on the type already assigned by
/// detection.
///
/// # Errors
///
/// Returns [`ExtractError`] if `bytes` is malformed for `detected`, or if
/// `detected` is not one of the structured-candidate types (callers should
/// check [`DetectedType::is_structured_candidate`] first).
pub fn extract_rows(detected: DetectedType, bytes: &[u8]) -> Result<ExtractedRows, ExtractError> {
    match detected {
        DetectedType::Tabular => tabular(bytes),
        DetectedType::Json => json::extract(bytes),
        DetectedType::Xml => xml::extract(bytes),
        DetectedType::Yaml => yaml::extract(bytes),
        DetectedType::Html => html::extract(bytes),
        DetectedType::Text | DetectedType::Media | DetectedType::Binary => {
            Err(ExtractError::Malformed {
                    format: "structured",
                    message: "type is not a structured-candidate".into(),
            })
        }
    }
}

/// XLSX is distinguished from delimited CSV/TSV by its magic bytes (a ZIP
/// local-file-header signature), since both share [`DetectedType::Tabular`].
fn tabular(bytes: &[u8]) -> Result<ExtractedRows, ExtractError> {
    const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
    if bytes.starts_with(ZIP_MAGIC) {
        xlsx::extract(bytes)
    } else {
        csv_tsv::extract(bytes)
    }
}
