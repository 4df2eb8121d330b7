//! # ingest-parser
//!
//! File-type detection, structured row extraction, and text chunking for
//! the ingestion pipeline: `FileTypeDetector`, `RowExtractor`, and
//! the fixed-window chunker used by `DocumentIngestor`.

pub mod chunk;
pub mod detect;
pub mod error;
pub mod extract;

pub use chunk::chunk_text;
pub use detect::{DetectedType, detect};
pub use error::ExtractError;
pub use extract::{ExtractedRows, extract_rows};
