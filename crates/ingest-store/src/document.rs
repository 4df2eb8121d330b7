//! Document store: a DuckDB-backed JSON collection store, bridged onto the
//! Mongo-shaped `DocumentConfig` the rest of the pipeline's contract expects.
//!
//! `DuckDB`'s Rust API is synchronous; every operation here follows the
//! workspace's established bridge for that — `tokio::task::spawn_blocking`
//! around a connection held behind a `Mutex`, rather than pulling in a
//! dedicated async wrapper crate.

use std::sync::Arc;
use std::sync::Mutex;

use duckdb::{Connection, params};
use ingest_config::DocumentConfig;
use serde_json::Value;

use crate::error::StoreError;

/// A document identified by its id and its JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Value,
}

/// A DuckDB-backed document store, one collection per DuckDB table.
#[derive(Clone)]
pub struct DocumentStore {
    conn: Arc<Mutex<Connection>>,
}

impl DocumentStore {
    /// Open the store from configuration. `uri` is interpreted as a
    /// directory; `database` names the DuckDB file within it
    /// (`{uri}/{database}.duckdb`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DocumentNotConfigured`] if `config` has no
    /// uri/database, or [`StoreError::Document`] if the file cannot be
    /// opened.
    pub async fn connect(config: &DocumentConfig) -> Result<Self, StoreError> {
        if !config.is_configured() {
            return Err(StoreError::DocumentNotConfigured);
        }
        let path = format!("{}/{}.duckdb", config.uri.trim_end_matches('/'), config.database);
        Self::open(&path).await
    }

    async fn open(path: &str) -> Result<Self, StoreError> {
        let path = path.to_string();
        let conn = tokio::task::spawn_blocking(move || Connection::open(path)).await??;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// Open an in-memory store, for tests.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Document`] if DuckDB fails to initialize.
    pub async fn connect_in_memory() -> Result<Self, StoreError> {
        let conn = tokio::task::spawn_blocking(Connection::open_in_memory).await??;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    fn ensure_collection(conn: &Connection, collection: &str) -> Result<(), duckdb::Error> {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {collection} (id VARCHAR PRIMARY KEY, doc JSON NOT NULL)"
        ))
    }

    /// Insert one document, returning its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Document`] if the insert fails, or
    /// [`StoreError::Encode`] if `doc.body` cannot be serialized.
    pub async fn insert_one(&self, collection: &str, doc: Document) -> Result<String, StoreError> {
        let conn = self.conn.clone();
        let collection = collection.to_string();
        let body = serde_json::to_string(&doc.body)?;
        let id = doc.id.clone();
        tokio::task::spawn_blocking(move || -> Result<(), duckdb::Error> {
            let conn = conn.lock().expect("duckdb connection mutex poisoned");
            Self::ensure_collection(&conn, &collection)?;
            conn.execute(
                &format!("INSERT OR REPLACE INTO {collection} (id, doc) VALUES (?, ?)"),
                params![doc.id, body],
            )?;
            Ok(())
        })
        .await??;
        Ok(id)
    }

    /// Insert many documents into `collection` in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Document`] if any insert fails, or
    /// [`StoreError::Encode`] if a document body cannot be serialized.
    pub async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.clone();
        let collection = collection.to_string();
        let ids: Vec<String> = docs.iter().map(|d| d.id.clone()).collect();
        let encoded: Result<Vec<(String, String)>, serde_json::Error> =
            docs.into_iter().map(|d| Ok((d.id, serde_json::to_string(&d.body)?))).collect();
        let encoded = encoded?;

        tokio::task::spawn_blocking(move || -> Result<(), duckdb::Error> {
            let mut conn = conn.lock().expect("duckdb connection mutex poisoned");
            Self::ensure_collection(&conn, &collection)?;
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(&format!("INSERT OR REPLACE INTO {collection} (id, doc) VALUES (?, ?)"))?;
                for (id, body) in encoded {
                    stmt.execute(params![id, body])?;
                }
            }
            tx.commit()
        })
        .await??;
        Ok(ids)
    }

    /// Fetch up to `limit` documents from `collection`, most recently
    /// inserted first. `filter`, when non-empty, is matched as a DuckDB
    /// `json_extract_string` equality predicate against top-level field
    /// `filter.0` for value `filter.1` — the narrow query shape the
    /// ingestion orchestrator actually needs (looking up a file's prior
    /// catalog entry by `file_id`), not a general query language.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Document`] if the query fails.
    pub async fn find(&self, collection: &str, filter: Option<(String, String)>, limit: usize) -> Result<Vec<Document>, StoreError> {
        let conn = self.conn.clone();
        let collection = collection.to_string();
        tokio::task::spawn_blocking(move || -> Result<Vec<Document>, duckdb::Error> {
            let conn = conn.lock().expect("duckdb connection mutex poisoned");
            Self::ensure_collection(&conn, &collection)?;
            let sql = filter.as_ref().map_or_else(
                || format!("SELECT id, doc FROM {collection} LIMIT {limit}"),
                |(field, _)| format!("SELECT id, doc FROM {collection} WHERE json_extract_string(doc, '$.{field}') = ? LIMIT {limit}"),
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = if let Some((_, value)) = &filter {
                stmt.query_map(params![value], Self::row_to_document)?.collect::<Result<Vec<_>, _>>()?
            } else {
                stmt.query_map([], Self::row_to_document)?.collect::<Result<Vec<_>, _>>()?
            };
            Ok(rows)
        })
        .await?
        .map_err(StoreError::Document)
    }

    fn row_to_document(row: &duckdb::Row<'_>) -> Result<Document, duckdb::Error> {
        let id: String = row.get(0)?;
        let raw: String = row.get(1)?;
        let body = serde_json::from_str(&raw).unwrap_or(Value::Null);
        Ok(Document { id, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn insert_one_then_find_round_trips() {
        let store = DocumentStore::connect_in_memory().await.unwrap();
        let id = store
            .insert_one("files", Document { id: "f1".into(), body: json!({"file_id": "f1", "modality": "tabular"}) })
            .await
            .unwrap();
        assert_eq!(id, "f1");

        let found = store.find("files", Some(("file_id".to_string(), "f1".to_string())), 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].body["modality"], "tabular");
    }

    #[tokio::test]
    async fn insert_many_is_transactional() {
        let store = DocumentStore::connect_in_memory().await.unwrap();
        let docs = vec![
            Document { id: "c1".into(), body: json!({"chunk_index": 0}) },
            Document { id: "c2".into(), body: json!({"chunk_index": 1}) },
        ];
        let ids = store.insert_many("chunks", docs).await.unwrap();
        assert_eq!(ids, vec!["c1", "c2"]);

        let all = store.find("chunks", None, 10).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn unconfigured_document_config_is_rejected() {
        let config = DocumentConfig::default();
        let err = DocumentStore::connect(&config).await.unwrap_err();
        assert!(matches!(err, StoreError::DocumentNotConfigured));
    }
}
