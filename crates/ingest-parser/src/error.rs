//! Errors raised while detecting a file's modality or extracting rows from
//! it.

use ingest_core::errors::ErrorKind;
use thiserror::Error;

/// Errors from row extraction. [`FileTypeDetector`](crate::detect)
/// never errors by design; only extraction can fail, and only when
/// the input is malformed for its declared type.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("inconsistent CSV field counts across sampled lines")]
    InconsistentDelimiter,

    #[error("JSON payload is neither an array of objects nor a single object")]
    UnsupportedJsonShape,

    #[error("XML document has no repeating sibling elements under the root")]
    NoXmlRows,

    #[error("XLSX sheet is missing or has no header row")]
    MissingXlsxHeader,

    #[error("HTML document has no <table> with <th> headers")]
    NoHtmlTable,

    #[error("YAML payload is neither a sequence of mappings nor a single mapping")]
    UnsupportedYamlShape,

    #[error("failed to parse {format}: {message}")]
    Malformed { format: &'static str, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Parse
    }
}
