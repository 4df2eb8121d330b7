//! Errors surfaced by the orchestrator, each mapping to the shared
//! [`ErrorKind`] taxonomy so [`crate::orchestrator::IngestionOrchestrator`]
//! can format a uniform `"{prefix}/{detail}"` envelope error string
//! regardless of which stage or crate raised it.

use ingest_core::errors::ErrorKind;
use ingest_docs::DocsError;
use ingest_embed::WriterError;
use ingest_match::MatchError;
use ingest_parser::ExtractError;
use ingest_sql::{ExecutorError, SqlError};
use ingest_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("ingestion cancelled")]
    Cancelled,

    #[error("failed to read file at {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error(transparent)]
    Docs(#[from] DocsError),

    #[error(transparent)]
    Writer(#[from] WriterError),

    #[error(transparent)]
    Sql(#[from] SqlError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("sql path requires a configured relational store")]
    NoRelationalStore,
}

impl OrchestratorError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Io { .. } => ErrorKind::Io,
            Self::Extract(e) => e.kind(),
            Self::Match(_) | Self::NoRelationalStore => ErrorKind::Schema,
            Self::Executor(e) => e.kind(),
            Self::Docs(e) => e.kind(),
            Self::Writer(e) => e.kind(),
            Self::Sql(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }

    /// Format as the envelope's `"{prefix}/{detail}"` error string.
    #[must_use]
    pub fn envelope_message(&self) -> String {
        self.kind().format(self)
    }
}
