//! Embedding error types.

use ingest_core::errors::ErrorKind;

/// Errors that can occur during embedding generation.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// Model initialization failed (download, ONNX runtime, cache issues).
    #[error("model initialization failed: {0}")]
    InitFailed(String),

    /// Embedding generation failed (inference error, invalid input).
    #[error("embedding generation failed: {0}")]
    EmbedFailed(String),

    /// Model returned zero embeddings for a non-empty input.
    #[error("empty result from embedding model")]
    EmptyResult,

    /// Background task join failed.
    #[error("background task join failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl EmbeddingError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Vector
    }
}
