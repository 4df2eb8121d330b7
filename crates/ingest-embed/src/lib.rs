//! # ingest-embed
//!
//! Local embedding generation (`fastembed`, ONNX runtime) and the
//! `EmbeddingWriter` that turns a file's text and chunks into vector-index
//! nodes for the ingestion pipeline.

pub mod embedder;
pub mod error;
pub mod fastembed_embedder;
pub mod writer;

pub use embedder::{Embedder, FileEncoding, NullEmbedder};
pub use error::EmbeddingError;
pub use fastembed_embedder::FastEmbedder;
pub use writer::{EmbeddingWriter, WriterError};
