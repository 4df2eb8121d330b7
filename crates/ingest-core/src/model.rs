//! Catalog data model: files, rows, attributes, chunks, and graph nodes.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The coarse file kind used for routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Tabular,
    Document,
    Image,
    Video,
    Audio,
    Binary,
}

impl Modality {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tabular => "tabular",
            Self::Document => "document",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Binary => "binary",
        }
    }

    /// Whether this modality is routed through the document/vector path
    /// rather than the relational path, per of the ingestion design.
    #[must_use]
    pub const fn is_media_or_binary(self) -> bool {
        matches!(self, Self::Image | Self::Video | Self::Audio | Self::Binary)
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tagged scalar value carried through the row pipeline.
///
/// The source system represents rows as heterogeneous maps with dynamically
/// typed values; this variant makes that heterogeneity explicit so the
/// type-inference step in the SQL executor can consume it directly instead
/// of re-deriving types from strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Scalar {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Parse a raw field value (as produced by a row extractor before type
    /// inference has run) into the scalar that best represents it, without
    /// attempting datetime detection — that is the SQL executor's job once
    /// it has a full column sample.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Self::Real(f)
                } else {
                    Self::Text(n.to_string())
                }
            }
            serde_json::Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

/// A relational record: a mapping from attribute name to scalar value.
///
/// Invariant: all rows produced from one file share the same set of keys
/// after normalization.
pub type Row = BTreeMap<String, Scalar>;

/// An attribute as it appears in an incoming file, with its normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Attribute {
    pub original: String,
    pub normalized: String,
    pub inferred_type: Option<String>,
}

impl Attribute {
    #[must_use]
    pub fn new(original: impl Into<String>) -> Self {
        let original = original.into();
        let normalized = crate::attribute::normalize(&original);
        Self {
            original,
            normalized,
            inferred_type: None,
        }
    }

    #[must_use]
    pub fn is_id_attribute(&self) -> bool {
        crate::attribute::is_id_attribute(&self.normalized)
    }
}

/// A single column in a table descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnDescriptor {
    pub name: String,
    pub pg_type: String,
    pub nullable: bool,
    pub is_primary: bool,
}

/// A table descriptor owned by the schema evolution engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    #[must_use]
    pub fn primary_key(&self) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.is_primary)
    }

    /// Regular (non-ID) columns, used as the candidate pool for semantic
    /// attribute matching.
    #[must_use]
    pub fn regular_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns
        .iter()
        .filter(|c| !crate::attribute::is_id_attribute(&c.name))
    }
}

/// A chunk of extracted text, contiguous and dense within one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Chunk {
    pub file_id: String,
    pub chunk_index: u32,
    pub text: String,
    pub chunk_size: usize,
    pub tenant_id: String,
}

/// The kind of a graph (vector index) node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GraphNodeKind {
    File,
    Chunk,
}

impl GraphNodeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Chunk => "chunk",
        }
    }
}

/// A single entry in the vector index.
///
/// Keyed `"{file_id}:file"` or `"{file_id}:chunk:{i}"`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GraphNode {
    pub id: String,
    pub embedding: Vec<f32>,
    pub text: String,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl GraphNode {
    #[must_use]
    pub fn file_key(file_id: &str) -> String {
        format!("{file_id}:file")
    }

    #[must_use]
    pub fn chunk_key(file_id: &str, chunk_index: u32) -> String {
        format!("{file_id}:chunk:{chunk_index}")
    }
}

/// A storage-plan produced by a `PathPlanner` capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StoragePlan {
    pub path: String,
    pub moved_to: Option<String>,
}

/// The catalog entry for a single ingested file.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FileRecord {
    pub file_id: String,
    pub tenant_id: String,
    pub original_name: String,
    pub extension: String,
    pub size_bytes: u64,
    pub storage_uri: String,
    pub modality: Modality,
    pub collection_hint: String,
    pub summary_preview: String,
    pub descriptive_text: String,
    pub extra: BTreeMap<String, serde_json::Value>,
    #[serde(with = "crate::arrow_serde::timestamp_micros_utc")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modality_media_or_binary() {
        assert!(Modality::Image.is_media_or_binary());
        assert!(Modality::Binary.is_media_or_binary());
        assert!(!Modality::Tabular.is_media_or_binary());
        assert!(!Modality::Document.is_media_or_binary());
    }

    #[test]
    fn scalar_from_json_picks_int_over_real() {
        let v = serde_json::json!(42);
        assert_eq!(Scalar::from_json(&v), Scalar::Int(42));
    }

    #[test]
    fn scalar_from_json_null() {
        assert!(Scalar::from_json(&serde_json::Value::Null).is_null());
    }

    #[test]
    fn graph_node_keys() {
        assert_eq!(GraphNode::file_key("f1"), "f1:file");
        assert_eq!(GraphNode::chunk_key("f1", 3), "f1:chunk:3");
    }

    #[test]
    fn table_descriptor_regular_columns_excludes_ids() {
        let table = TableDescriptor {
            name: "products".into(),
            columns: vec![
                ColumnDescriptor {
                    name: "id".into(),
                    pg_type: "integer".into(),
                    nullable: false,
                    is_primary: true,
                },
                ColumnDescriptor {
                    name: "name".into(),
                    pg_type: "varchar(100)".into(),
                    nullable: true,
                    is_primary: false,
                },
            ],
        };
        let regular: Vec<_> = table.regular_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(regular, vec!["name"]);
        assert_eq!(table.primary_key().unwrap().name, "id");
    }
}
