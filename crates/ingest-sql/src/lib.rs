//! # ingest-sql
//!
//! Relational schema introspection, DDL, and row insertion for the
//! ingestion pipeline's SQL executor: given a routing decision from
//! `ingest-match`, bring a table's shape up to date and write the rows.
//!
//! Built on the `libsql` crate rather than a Postgres wire client —
//! embeddable, async-native, and speaks enough SQL to carry the
//! column-type inference and ALTER-driven evolution this pipeline needs.

pub mod descriptor;
pub mod error;
pub mod executor;
pub mod helpers;
pub mod insert;
pub mod pk;
pub mod retry;
pub mod store;
pub mod types;

pub use error::SqlError;
pub use executor::{ExecutionOutcome, ExecutorError, execute};
pub use insert::{InsertOutcome, insert_rows};
pub use store::SqlStore;
pub use types::infer_column_type;
