//! Errors from the document store, vector index, and object store adapters.

use ingest_core::errors::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store is not configured (MONGO_URI/MONGO_DB missing)")]
    DocumentNotConfigured,

    #[error("document store operation failed: {0}")]
    Document(#[from] duckdb::Error),

    #[error("vector index operation failed: {0}")]
    Vector(#[source] lancedb::Error),

    #[error("object store operation failed: {0}")]
    Object(#[from] object_store::Error),

    #[error("object store path is invalid: {0}")]
    InvalidPath(String),

    #[error("value could not be JSON-encoded: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("background task join failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl StoreError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DocumentNotConfigured | Self::Document(_) | Self::Join(_) | Self::Encode(_) => ErrorKind::Store,
            Self::Vector(_) => ErrorKind::Vector,
            Self::Object(_) | Self::InvalidPath(_) => ErrorKind::Io,
        }
    }
}
