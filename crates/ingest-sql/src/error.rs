//! Errors from relational schema introspection, DDL, and row insertion.

use ingest_core::errors::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlError {
    #[error("relational store is not configured (host/db_name missing)")]
    NotConfigured,

    #[error("failed to open relational store: {0}")]
    Connect(#[source] libsql::Error),

    #[error("DDL failed: {0}")]
    Ddl(#[source] libsql::Error),

    #[error("insert failed: {0}")]
    Insert(#[source] libsql::Error),

    #[error("row read failed: {0}")]
    Query(#[source] libsql::Error),

    #[error("could not parse column value: {0}")]
    Parse(String),

    #[error("primary-key block exhausted after {attempts} attempts")]
    PkExhausted { attempts: u32 },

    #[error("cannot insert {count} row(s) with no columns")]
    EmptyRow { count: usize },
}

impl SqlError {
    /// Map this error onto one of the cross-cutting envelope prefixes: DDL
    /// and introspection failures are `schema/...`, everything downstream
    /// of a successful DDL step is `insert/...`.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured | Self::Connect(_) | Self::Ddl(_) | Self::Query(_) | Self::Parse(_) => ErrorKind::Schema,
            Self::Insert(_) | Self::PkExhausted { .. } | Self::EmptyRow { .. } => ErrorKind::Insert,
        }
    }
}
