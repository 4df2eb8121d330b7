//! Errors from structure classification, attribute matching, and schema
//! evolution.

use ingest_core::errors::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("no attributes to classify or match")]
    Empty,

    #[error("table name could not be synthesized: no regular attributes available")]
    NoSynthesizableName,
}

impl MatchError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Schema
    }
}
