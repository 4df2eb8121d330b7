//! The `Embedder` capability: text and file encoding behind a trait, so the
//! orchestrator can run with a real model or a no-op stand-in without
//! caring which.

use std::future::Future;

use ingest_core::model::Modality;

use crate::error::EmbeddingError;

/// What `encode_file` produces for a non-text file: a vector (possibly a
/// zero vector if the file carries no extractable signal), a caption, and
/// any extra fields the concrete encoder wants to surface.
#[derive(Debug, Clone, Default)]
pub struct FileEncoding {
    pub vector: Vec<f32>,
    pub caption: String,
    pub extra: std::collections::BTreeMap<String, serde_json::Value>,
}

/// A capability for turning text or files into embedding vectors.
///
/// Implementations that can't load a model should still construct
/// successfully and report `available() == false`; the orchestrator
/// degrades to `graph_nodes=[]` rather than failing ingestion when that's
/// the case.
pub trait Embedder: Send + Sync {
    /// Whether this embedder is usable. Checked by the orchestrator before
    /// every call.
    fn available(&self) -> bool;

    /// Encode `text` into a single embedding vector.
    fn encode_text(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, EmbeddingError>> + Send;

    /// Encode a non-text file at `path` for `modality` into a vector plus a
    /// caption/transcript. The default fastembed-backed implementation has
    /// no multimodal encoder, so it falls back to embedding the filename.
    fn encode_file(&self, path: &std::path::Path, modality: Modality) -> impl Future<Output = Result<FileEncoding, EmbeddingError>> + Send;
}

/// An embedder that is always unavailable — used when no model could be
/// loaded, or in tests that don't exercise embedding.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEmbedder;

impl Embedder for NullEmbedder {
    fn available(&self) -> bool {
        false
    }

    async fn encode_text(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::InitFailed("no embedding model configured".to_string()))
    }

    async fn encode_file(&self, _path: &std::path::Path, _modality: Modality) -> Result<FileEncoding, EmbeddingError> {
        Err(EmbeddingError::InitFailed("no embedding model configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_embedder_reports_unavailable() {
        let embedder = NullEmbedder;
        assert!(!embedder.available());
        assert!(embedder.encode_text("hello").await.is_err());
    }
}
