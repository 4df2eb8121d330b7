//! # ingest-docs
//!
//! Text extraction, summarization, collection-hint inference, chunking,
//! and document/media persistence for the ingestion pipeline.

pub mod collection;
pub mod error;
pub mod extract;
pub mod ingestor;
pub mod summary;

pub use collection::infer_collection;
pub use error::DocsError;
pub use extract::{LossyTextExtractor, TextExtractor};
pub use ingestor::{DocumentIngestOutcome, DocumentIngestRequest, DocumentIngestor};
pub use summary::build_summary;
