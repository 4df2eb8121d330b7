//! # ingest-match
//!
//! Structure classification, attribute matching, and schema evolution for
//! the ingestion pipeline:
//!
//! - [`classify`] — `StructureClassifier`: routes a parsed payload to
//! the relational or document/vector path.
//! - [`matcher`] — `AttributeMatcher`: maps incoming attributes onto
//! an existing table's columns.
//! - [`catalog`] / [`evolve`] — `SchemaEvolutionEngine`: the shared
//! table-descriptor cache and the decision procedure that chooses
//! between reusing, evolving, or creating a table.

pub mod catalog;
pub mod classify;
pub mod error;
pub mod evolve;
pub mod matcher;
pub mod similarity;

pub use catalog::{SchemaCatalog, SharedCatalog};
pub use classify::{Classification, ClassifierSignals, StructureKind, classify};
pub use error::MatchError;
pub use evolve::{Decision, EvolutionResult, evaluate, synthesize_table_name};
pub use matcher::{MatchResult, match_attributes};
