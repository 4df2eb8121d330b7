//! Errors from text extraction, summarization, and document persistence.

use ingest_core::errors::ErrorKind;
use ingest_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocsError {
    #[error("failed to read file for text extraction: {0}")]
    Extract(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode document body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl DocsError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Extract(_) => ErrorKind::Extract,
            Self::Store(_) | Self::Encode(_) => ErrorKind::Store,
        }
    }
}
