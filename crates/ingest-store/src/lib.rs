//! # ingest-store
//!
//! Document store, vector index, and object store adapters for the
//! ingestion pipeline: the storage backends the relational path (handled
//! separately by `ingest-sql`) doesn't cover.

pub mod document;
pub mod error;
pub mod object;
pub mod vector;

pub use document::{Document, DocumentStore};
pub use error::StoreError;
pub use object::ObjectStore;
pub use vector::{VectorIndex, VectorMatch};
