//! `EmbeddingWriter`: encodes a file (and its chunks) and upserts the
//! resulting nodes into the vector index.
//!
//! Accepts a list of nodes `{id, embedding, text, metadata}` conceptually;
//! in practice it builds that list itself from a file's text and chunks so
//! callers don't have to hand-assemble `GraphNode`s.

use ingest_core::model::{Chunk, GraphNode, Modality};
use ingest_store::{StoreError, VectorIndex};

use crate::embedder::Embedder;
use crate::error::EmbeddingError;

#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    #[error(transparent)]
    Embed(#[from] EmbeddingError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WriterError {
    #[must_use]
    pub const fn kind(&self) -> ingest_core::errors::ErrorKind {
        ingest_core::errors::ErrorKind::Vector
    }
}

pub struct EmbeddingWriter<E: Embedder> {
    embedder: E,
    index: VectorIndex,
}

impl<E: Embedder> EmbeddingWriter<E> {
    #[must_use]
    pub const fn new(embedder: E, index: VectorIndex) -> Self {
        Self { embedder, index }
    }

    /// Whether the writer can produce and persist embeddings right now.
    /// When `false`, the orchestrator should record `graph_nodes=[]` rather
    /// than call [`Self::write`].
    #[must_use]
    pub fn available(&self) -> bool {
        self.embedder.available() && self.index.available()
    }

    /// The underlying embedder, for callers that need a caption/transcript
    /// ahead of [`Self::write`] (media files, where the orchestrator feeds
    /// the caption to the document ingestor before persisting).
    #[must_use]
    pub const fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Encode a file's descriptive text and its chunks, then upsert the
    /// resulting nodes. Returns the ids written, in file-node-then-chunks
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`WriterError::Embed`] if encoding fails, or
    /// [`WriterError::Store`] if the upsert fails.
    pub async fn write(
        &mut self,
        file_id: &str,
        modality: Modality,
        collection: &str,
        storage_uri: &str,
        file_text: &str,
        chunks: &[Chunk],
    ) -> Result<Vec<String>, WriterError> {
        let mut nodes = Vec::with_capacity(1 + chunks.len());

        let file_vector = self.embedder.encode_text(file_text).await?;
        nodes.push(GraphNode {
            id: GraphNode::file_key(file_id),
            embedding: file_vector,
            text: file_text.to_string(),
            metadata: node_metadata(file_id, "file", modality, collection, storage_uri),
        });

        for chunk in chunks {
            let vector = self.embedder.encode_text(&chunk.text).await?;
            nodes.push(GraphNode {
                id: GraphNode::chunk_key(file_id, chunk.chunk_index),
                embedding: vector,
                text: chunk.text.clone(),
                metadata: node_metadata(file_id, "chunk", modality, collection, storage_uri),
            });
        }

        let ids: Vec<String> = nodes.iter().map(|n| n.id.clone()).collect();
        self.index.upsert(&nodes).await?;
        Ok(ids)
    }
}

fn node_metadata(
    file_id: &str,
    node_type: &str,
    modality: Modality,
    collection: &str,
    path: &str,
) -> std::collections::BTreeMap<String, serde_json::Value> {
    std::collections::BTreeMap::from([
        ("file_id".to_string(), serde_json::Value::String(file_id.to_string())),
        ("type".to_string(), serde_json::Value::String(node_type.to_string())),
        ("modality".to_string(), serde_json::Value::String(modality.as_str().to_string())),
        ("collection".to_string(), serde_json::Value::String(collection.to_string())),
        ("path".to_string(), serde_json::Value::String(path.to_string())),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_metadata_carries_the_required_minimum_fields() {
        let metadata = node_metadata("f1", "chunk", Modality::Document, "documents", "documents/f1.md");
        for key in ["file_id", "type", "modality", "collection", "path"] {
            assert!(metadata.contains_key(key), "missing {key}");
        }
    }
}
