//! The uniform ingestion result envelope.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{Modality, StoragePlan};

/// Outcome of a single `ingest` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IngestStatus {
    Completed,
    Error,
    Skipped,
}

/// The collections backing document persistence, per persisted-state
/// layout (`files` plus one per `collection_hint`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MongoCollections {
    pub files: String,
    pub chunks: String,
}

/// The uniform result structure returned by the ingestion orchestrator.
/// Every ingestion call, regardless of which path it took, returns
/// exactly this shape.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IngestEnvelope {
    pub status: IngestStatus,
    pub file_id: Option<String>,
    pub collection: Option<String>,
    pub modality: Modality,
    pub chunk_count: u32,
    pub graph_nodes: Vec<String>,
    pub mongo_collections: MongoCollections,
    pub storage_plan: Option<StoragePlan>,
    pub error: Option<String>,
    /// Free-form diagnostic details not part of the stable envelope shape
    /// (e.g. schema decision, rows inserted) but useful for structured
    /// logging and tests.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl IngestEnvelope {
    #[must_use]
    pub fn skipped(modality: Modality) -> Self {
        Self {
            status: IngestStatus::Skipped,
            file_id: None,
            collection: None,
            modality,
            chunk_count: 0,
            graph_nodes: Vec::new(),
            mongo_collections: MongoCollections {
                files: "files".into(),
                chunks: String::new(),
            },
            storage_plan: None,
            error: None,
            extra: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn error(modality: Modality, error: impl Into<String>) -> Self {
        Self {
            status: IngestStatus::Error,
            file_id: None,
            collection: None,
            modality,
            chunk_count: 0,
            graph_nodes: Vec::new(),
            mongo_collections: MongoCollections {
                files: "files".into(),
                chunks: String::new(),
            },
            storage_plan: None,
            error: Some(error.into()),
            extra: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, IngestStatus::Completed)
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.extra.insert(key.into(), v);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_carries_message() {
        let env = IngestEnvelope::error(Modality::Binary, "io/copy failed");
        assert_eq!(env.status, IngestStatus::Error);
        assert_eq!(env.error.as_deref(), Some("io/copy failed"));
        assert!(!env.is_success());
    }

    #[test]
    fn skipped_envelope_has_no_file_id() {
        let env = IngestEnvelope::skipped(Modality::Tabular);
        assert_eq!(env.status, IngestStatus::Skipped);
        assert!(env.file_id.is_none());
    }
}
