//! Cross-cutting error types for the ingestion pipeline.
//!
//! This module defines errors that can originate from any crate in the
//! system. Domain-specific errors (e.g. `SqlError`, `DetectError`) are
//! defined in their respective crates and each maps deterministically to one
//! of the [`ErrorKind`] prefixes below for surfacing in the
//! ingestion envelope.

use std::fmt;

use thiserror::Error;

/// Errors that can be raised by any ingestion crate outside of its own
/// domain-specific error enum (e.g. generic validation failures surfaced
/// while assembling a catalog entry).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Data failed validation (schema, format, constraints).
    #[error("validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// The envelope error-kind prefixes.
///
/// Every domain error enum in this workspace implements a `kind_prefix()`
/// method returning one of these, so the orchestrator can format the
/// envelope's `error` field as `"{prefix}/{detail}"` regardless of which
/// crate raised the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Row extractor failed (malformed JSON, inconsistent CSV field counts,
    /// unreadable XML).
    Parse,
    /// Text extractor failed or returned empty for a type that requires
    /// text.
    Extract,
    /// Relational DDL or metadata lookup failed.
    Schema,
    /// INSERT failed after DDL succeeded.
    Insert,
    /// Document store write failed.
    Store,
    /// Embedding or vector-index upsert failed.
    Vector,
    /// Object-store copy failed.
    Io,
    /// External cancellation.
    Cancelled,
}

impl ErrorKind {
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Extract => "extract",
            Self::Schema => "schema",
            Self::Insert => "insert",
            Self::Store => "store",
            Self::Vector => "vector",
            Self::Io => "io",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a failure of this kind is recoverable without failing the
    /// current file's ingestion.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Vector)
    }

    /// Format an envelope-style `"{prefix}/{detail}"` error string.
    #[must_use]
    pub fn format(self, detail: impl fmt::Display) -> String {
        format!("{}/{detail}", self.prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_vector_is_non_terminal() {
        let kinds = [
            ErrorKind::Parse,
            ErrorKind::Extract,
            ErrorKind::Schema,
            ErrorKind::Insert,
            ErrorKind::Store,
            ErrorKind::Vector,
            ErrorKind::Io,
            ErrorKind::Cancelled,
        ];
        let non_terminal: Vec<_> = kinds.iter().filter(|k| !k.is_terminal()).collect();
        assert_eq!(non_terminal, vec![&ErrorKind::Vector]);
    }

    #[test]
    fn format_prefixes_detail() {
        assert_eq!(ErrorKind::Schema.format("create_table failed"), "schema/create_table failed");
    }
}
