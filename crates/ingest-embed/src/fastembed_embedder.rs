//! `fastembed`-backed text embedding (ONNX runtime, local, no network calls
//! past the first model download).
//!
//! `fastembed` is synchronous — the ONNX runtime and Rayon handle
//! parallelism internally — so every call here is bridged through
//! `tokio::task::spawn_blocking`, the same pattern the workspace uses for
//! DuckDB.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};
use ingest_core::model::Modality;

use crate::embedder::{Embedder, FileEncoding};
use crate::error::EmbeddingError;

fn cache_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".ingest").join("cache").join("fastembed")
}

/// A local text embedder backed by `fastembed`'s `AllMiniLML6V2` model
/// (384-dim, mean pooling, no query/passage prefix convention).
#[derive(Clone)]
pub struct FastEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
}

impl FastEmbedder {
    /// Load the default model, downloading it to a stable cache directory
    /// on first run.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::InitFailed`] if the model cannot be loaded.
    pub async fn load() -> Result<Self, EmbeddingError> {
        tokio::task::spawn_blocking(|| {
            let options = TextInitOptions::new(EmbeddingModel::AllMiniLML6V2).with_cache_dir(cache_dir()).with_show_download_progress(false);
            let model = TextEmbedding::try_new(options).map_err(|e| EmbeddingError::InitFailed(e.to_string()))?;
            Ok(Self { model: Arc::new(Mutex::new(model)) })
        })
        .await?
    }
}

impl Embedder for FastEmbedder {
    fn available(&self) -> bool {
        true
    }

    async fn encode_text(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let model = self.model.clone();
        let text = text.to_string();
        tokio::task::spawn_blocking(move || {
            let mut model = model.lock().expect("fastembed model mutex poisoned");
            let mut vectors = model.embed(vec![text], None).map_err(|e| EmbeddingError::EmbedFailed(e.to_string()))?;
            vectors.pop().ok_or(EmbeddingError::EmptyResult)
        })
        .await?
    }

    /// No multimodal encoder is wired in; falls back to embedding the
    /// filename so media files still get a (weak) position in the index
    /// rather than being skipped outright.
    async fn encode_file(&self, path: &std::path::Path, modality: Modality) -> Result<FileEncoding, EmbeddingError> {
        let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        let caption = format!("{modality} file: {name}");
        let vector = self.encode_text(&caption).await?;
        Ok(FileEncoding { vector, caption, extra: std::collections::BTreeMap::new() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_dir_is_under_home() {
        let dir = cache_dir();
        assert!(dir.ends_with(".ingest/cache/fastembed"));
    }
}
