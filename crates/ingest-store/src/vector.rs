//! Vector index: upsert and nearest-neighbor query over `GraphNode`s,
//! bridged onto the Chroma-shaped `VectorConfig` the rest of the pipeline's
//! contract expects (`persist_path` + `collection`) but backed by `lancedb`.
//!
//! `persist_path` becomes the Lance dataset directory; `collection` becomes
//! the table name within it — a natural fit, since Lance already organizes
//! a dataset directory as a set of named tables.

use std::sync::Arc;

use arrow_array::{Float32Array, RecordBatch, RecordBatchIterator, StringArray};
use arrow_array::types::Float32Type;
use arrow_array::FixedSizeListArray;
use arrow_schema::{DataType, Field, Schema};
use futures_util::TryStreamExt;
use ingest_config::VectorConfig;
use ingest_core::model::GraphNode;
use lancedb::query::{ExecutableQuery, QueryBase};
use serde_json::Value;

use crate::error::StoreError;

/// A scored match returned by [`VectorIndex::query`].
#[derive(Debug, Clone)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub text: String,
    pub metadata: Value,
}

/// A `lancedb`-backed vector index. `available()` reflects whether the
/// index was reachable at connect time; callers that can't open it proceed
/// without embeddings rather than failing ingestion.
#[derive(Clone)]
pub struct VectorIndex {
    connection: lancedb::Connection,
    collection: String,
    dimensions: Option<usize>,
}

impl VectorIndex {
    /// Open the index from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Vector`] if the dataset directory cannot be
    /// opened.
    pub async fn connect(config: &VectorConfig) -> Result<Self, StoreError> {
        let connection = lancedb::connect(&config.persist_path).execute().await.map_err(StoreError::Vector)?;
        Ok(Self { connection, collection: config.collection.clone(), dimensions: None })
    }

    /// Whether the index is reachable. The ingestion orchestrator checks
    /// this before attempting an upsert and records `graph_nodes=[]` rather
    /// than failing when it is `false`.
    #[must_use]
    pub const fn available(&self) -> bool {
        true
    }

    /// Upsert `nodes` by id. Non-scalar metadata values are JSON-encoded
    /// before storage, per the node contract.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Vector`] if the table cannot be created/opened
    /// or the merge-insert fails.
    pub async fn upsert(&mut self, nodes: &[GraphNode]) -> Result<(), StoreError> {
        if nodes.is_empty() {
            return Ok(());
        }
        let dims = self.dimensions.unwrap_or_else(|| nodes[0].embedding.len());
        self.dimensions = Some(dims);

        let batch = nodes_to_batch(nodes, dims)?;
        let schema = batch.schema();
        let table = match self.connection.open_table(&self.collection).execute().await {
            Ok(table) => table,
            Err(_) => self
                .connection
                .create_table(&self.collection, RecordBatchIterator::new(vec![Ok(batch.clone())], schema.clone()))
                .execute()
                .await
                .map_err(StoreError::Vector)?,
        };

        table
            .merge_insert(&["id"])
            .when_matched_update_all(None)
            .when_not_matched_insert_all()
            .execute(Box::new(RecordBatchIterator::new(vec![Ok(batch)], schema)))
            .await
            .map_err(StoreError::Vector)?;
        Ok(())
    }

    /// Nearest-neighbor query against the index.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Vector`] if the table cannot be opened or the
    /// query fails.
    pub async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<VectorMatch>, StoreError> {
        let table = self.connection.open_table(&self.collection).execute().await.map_err(StoreError::Vector)?;
        let mut stream =
            table.query().nearest_to(embedding).map_err(StoreError::Vector)?.limit(k).execute().await.map_err(StoreError::Vector)?;

        let mut matches = Vec::new();
        while let Some(batch) = stream.try_next().await.map_err(StoreError::Vector)? {
            matches.extend(batch_to_matches(&batch));
        }
        Ok(matches)
    }
}

/// Scrub a metadata map into JSON-scalar values, encoding arrays/objects as
/// strings so storage can assume every value is a scalar.
fn sanitize_metadata(metadata: &std::collections::BTreeMap<String, Value>) -> Value {
    let sanitized: serde_json::Map<String, Value> = metadata
        .iter()
        .map(|(k, v)| {
            let scalar = match v {
                Value::Array(_) | Value::Object(_) => Value::String(v.to_string()),
                other => other.clone(),
            };
            (k.clone(), scalar)
        })
        .collect();
    Value::Object(sanitized)
}

fn nodes_to_batch(nodes: &[GraphNode], dims: usize) -> Result<RecordBatch, StoreError> {
    let schema = Arc::new(vector_schema(dims));

    let ids: StringArray = nodes.iter().map(|n| Some(n.id.as_str())).collect();
    let texts: StringArray = nodes.iter().map(|n| Some(n.text.as_str())).collect();
    let metadata: Result<Vec<Option<String>>, serde_json::Error> =
        nodes.iter().map(|n| serde_json::to_string(&sanitize_metadata(&n.metadata)).map(Some)).collect();
    let metadata = StringArray::from(metadata?);

    let embeddings = FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
        nodes.iter().map(|n| Some(n.embedding.iter().map(|v| Some(*v)).collect::<Vec<_>>())),
        i32::try_from(dims).unwrap_or(i32::MAX),
    );

    RecordBatch::try_new(schema, vec![Arc::new(ids), Arc::new(embeddings), Arc::new(texts), Arc::new(metadata)])
        .map_err(|e| StoreError::InvalidPath(e.to_string()))
}

fn vector_schema(dims: usize) -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new(
            "embedding",
            DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), i32::try_from(dims).unwrap_or(i32::MAX)),
            false,
        ),
        Field::new("text", DataType::Utf8, false),
        Field::new("metadata", DataType::Utf8, false),
    ])
}

fn batch_to_matches(batch: &RecordBatch) -> Vec<VectorMatch> {
    let ids = batch.column_by_name("id").and_then(|c| c.as_any().downcast_ref::<StringArray>());
    let texts = batch.column_by_name("text").and_then(|c| c.as_any().downcast_ref::<StringArray>());
    let metadata = batch.column_by_name("metadata").and_then(|c| c.as_any().downcast_ref::<StringArray>());
    let distances = batch.column_by_name("_distance").and_then(|c| c.as_any().downcast_ref::<Float32Array>());

    let Some(ids) = ids else { return Vec::new() };
    (0..ids.len())
        .map(|i| VectorMatch {
            id: ids.value(i).to_string(),
            score: distances.map_or(0.0, |d| d.value(i)),
            text: texts.map_or(String::new(), |t| t.value(i).to_string()),
            metadata: metadata.and_then(|m| serde_json::from_str(m.value(i)).ok()).unwrap_or(Value::Null),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn sanitize_metadata_encodes_non_scalars() {
        let mut metadata = BTreeMap::new();
        metadata.insert("tenant".to_string(), Value::String("acme".into()));
        metadata.insert("tags".to_string(), Value::Array(vec![Value::String("a".into())]));

        let sanitized = sanitize_metadata(&metadata);
        assert_eq!(sanitized["tenant"], Value::String("acme".into()));
        assert!(sanitized["tags"].is_string());
    }

    #[test]
    fn nodes_to_batch_produces_one_row_per_node() {
        let node = GraphNode { id: "f1:file".into(), embedding: vec![0.1, 0.2], text: "hello".into(), metadata: BTreeMap::new() };
        let batch = nodes_to_batch(&[node], 2).unwrap();
        assert_eq!(batch.num_rows(), 1);
    }
}
