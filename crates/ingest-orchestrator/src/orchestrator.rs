//! `IngestionOrchestrator`: the entry point that ties every other crate
//! together into the uniform `ingest(path, tenant, hints) -> envelope`
//! contract.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use ingest_core::envelope::{IngestEnvelope, IngestStatus, MongoCollections};
use ingest_core::model::{Attribute, Modality, Row, Scalar, StoragePlan};
use ingest_config::IngestConfig;
use ingest_docs::{DocumentIngestRequest, DocumentIngestor, LossyTextExtractor};
use ingest_embed::{EmbeddingWriter, Embedder, FastEmbedder, NullEmbedder};
use ingest_match::catalog::SharedCatalog;
use ingest_match::classify::{StructureKind, classify};
use ingest_parser::detect::DetectedType;
use ingest_parser::extract::{ExtractedRows, extract_rows};
use ingest_sql::executor::execute;
use ingest_sql::store::SqlStore;
use ingest_sql::types::infer_column_type;
use ingest_store::{DocumentStore, ObjectStore, VectorIndex};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn};

use crate::error::OrchestratorError;
use crate::modality;
use crate::path_planner::{IdentityPathPlanner, PathPlanner};
use crate::signals;

/// Input to one [`IngestionOrchestrator::process_file`] call.
pub struct IngestRequest<'a> {
    pub path: &'a Path,
    pub tenant_id: &'a str,
    pub original_name: &'a str,
    pub modality_hint: Option<Modality>,
    pub collection_hint: Option<String>,
    pub primary_key_hint: Option<&'a str>,
}

/// One of the possible internal vector-backed embedder choices the
/// orchestrator can be built with; boxed behind the `Embedder` trait
/// at the `EmbeddingWriter` boundary so the orchestrator struct itself
/// stays generic-free.
enum AnyEmbedder {
    FastEmbed(FastEmbedder),
    Null(NullEmbedder),
}

impl Embedder for AnyEmbedder {
    fn available(&self) -> bool {
        match self {
            Self::FastEmbed(e) => e.available(),
            Self::Null(e) => e.available(),
        }
    }

    async fn encode_text(&self, text: &str) -> Result<Vec<f32>, ingest_embed::EmbeddingError> {
        match self {
            Self::FastEmbed(e) => e.encode_text(text).await,
            Self::Null(e) => e.encode_text(text).await,
        }
    }

    async fn encode_file(&self, path: &Path, modality: Modality) -> Result<ingest_embed::FileEncoding, ingest_embed::EmbeddingError> {
        match self {
            Self::FastEmbed(e) => e.encode_file(path, modality).await,
            Self::Null(e) => e.encode_file(path, modality).await,
        }
    }
}

/// Ties the relational ingestion path, the document/vector ingestion path,
/// and the structure classifier together behind the single `process_file`
/// entry point.
pub struct IngestionOrchestrator {
    relational: Option<SqlStore>,
    catalog: SharedCatalog,
    documents: DocumentIngestor<LossyTextExtractor>,
    embeddings: Option<Arc<Mutex<EmbeddingWriter<AnyEmbedder>>>>,
    object_store: Option<ObjectStore>,
    move_files: bool,
    chunk_size: usize,
    chunk_overlap: usize,
    insert_batch_size: usize,
}

impl IngestionOrchestrator {
    /// Build an orchestrator from layered configuration, connecting every
    /// capability that is configured and degrading the rest to their
    /// `available() == false` stand-ins.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Sql`] or [`OrchestratorError::Store`] if
    /// a *configured* capability fails to connect. An unconfigured
    /// capability is not an error — it is simply absent.
    pub async fn from_config(config: &IngestConfig) -> Result<Self, OrchestratorError> {
        let relational =
            if config.relational.is_configured() { Some(SqlStore::connect(&config.relational).await?) } else { None };

        let document_store = if config.document.is_configured() {
            Some(DocumentStore::connect(&config.document).await?)
        } else {
            None
        };

        let object_store = Some(ObjectStore::open(&config.object_store)?);

        let embeddings = if config.vector.is_configured() {
            let index = VectorIndex::connect(&config.vector).await?;
            let embedder = match FastEmbedder::load().await {
                Ok(model) => AnyEmbedder::FastEmbed(model),
                Err(e) => {
                    warn!(error = %e, "embedding model failed to load; continuing with embeddings unavailable");
                    AnyEmbedder::Null(NullEmbedder)
                }
            };
            Some(Arc::new(Mutex::new(EmbeddingWriter::new(embedder, index))))
        } else {
            None
        };

        let documents = DocumentIngestor::new(
            LossyTextExtractor,
            document_store,
            object_store.clone(),
            config.general.chunk_size,
            config.general.chunk_overlap,
        );

        Ok(Self {
            relational,
            catalog: SharedCatalog::new(),
            documents,
            embeddings,
            object_store,
            move_files: config.path_planner.move_files,
            chunk_size: config.general.chunk_size,
            chunk_overlap: config.general.chunk_overlap,
            insert_batch_size: config.general.insert_batch_size,
        })
    }

    /// Run the full ingestion sequence for one file. Never returns an
    /// `Err`: every internal failure is converted into an error envelope
    /// per the component's failure policy, so callers always get a uniform
    /// result back regardless of which stage tripped.
    pub async fn process_file(&self, request: IngestRequest<'_>, cancel: &CancellationToken) -> IngestEnvelope {
        let span = info_span!("ingest", tenant_id = %request.tenant_id, path = %request.path.display());
        let _enter = span.enter();

        if cancel.is_cancelled() {
            return IngestEnvelope::error(Modality::Binary, OrchestratorError::Cancelled.envelope_message());
        }

        match self.run(request, cancel).await {
            Ok(envelope) => envelope,
            Err((modality, err)) => {
                if err.kind().is_terminal() {
                    tracing::error!(error = %err, "ingestion failed");
                } else {
                    warn!(error = %err, "non-terminal capability failure");
                }
                IngestEnvelope::error(modality, err.envelope_message())
            }
        }
    }

    /// Inner sequence. Returns `(modality, error)` rather than a bare
    /// `OrchestratorError` on failure so the caller can still build an
    /// envelope with the already-resolved modality.
    async fn run(&self, request: IngestRequest<'_>, cancel: &CancellationToken) -> Result<IngestEnvelope, (Modality, OrchestratorError)> {
        let bytes = tokio::fs::read(request.path)
            .await
            .map_err(|e| (Modality::Binary, OrchestratorError::Io { path: request.path.display().to_string(), source: e }))?;

        let extension = request.path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        let detected = ingest_parser::detect(request.path, None, &bytes);
        let modality = request.modality_hint.unwrap_or_else(|| modality::resolve(detected, extension));

        info!(stage = "detect", modality = %modality, "resolved modality");

        if cancel.is_cancelled() {
            return Err((modality, OrchestratorError::Cancelled));
        }

        if modality.is_media_or_binary() {
            return self.run_document_path(&request, modality, None, &[], cancel).await.map_err(|e| (modality, e));
        }

        // Structured-candidate types attempt row extraction and structure
        // classification; plain text re-attempts a tabular parse first per
        // the resolved text-file structure check (see DESIGN.md).
        let (classification_input, resolved_detected) = if detected.is_structured_candidate() {
            (extract_rows(detected, &bytes), detected)
        } else {
            (extract_rows(DetectedType::Tabular, &bytes), DetectedType::Tabular)
        };

        if cancel.is_cancelled() {
            return Err((modality, OrchestratorError::Cancelled));
        }

        match classification_input {
            Ok(extracted) if !extracted.is_empty() => {
                let attributes = attributes_from_rows(&extracted.rows);
                let signals = signals::structured_signals(resolved_detected, &extracted, &attributes);
                let classification = classify(&signals);
                info!(stage = "classify", kind = ?classification.kind, confidence = classification.confidence, "classified payload");

                match classification.kind {
                    StructureKind::Sql => {
                        self.run_sql_path(&request, Modality::Tabular, attributes, extracted, cancel).await.map_err(|e| (Modality::Tabular, e))
                    }
                    StructureKind::NoSql => {
                        let names: Vec<String> = attributes.iter().map(|a| a.original.clone()).collect();
                        self.run_document_path(&request, Modality::Document, None, &names, cancel)
                        .await
                        .map_err(|e| (Modality::Document, e))
                    }
                }
            }
            _ => {
                // Not structured (or extraction failed outright): fall
                // through to the plain-text document path. `extract`
                // failure is swallowed here deliberately — a file that
                // doesn't parse as any structured type is, by definition,
                // the document path's problem, not an extraction error.
                self.run_document_path(&request, Modality::Document, None, &[], cancel).await.map_err(|e| (Modality::Document, e))
            }
        }
    }

    /// Execute rows against the relational store, then add a catalog entry
    /// with `descriptive_text = summary(rows)`.
    async fn run_sql_path(
        &self,
        request: &IngestRequest<'_>,
        modality: Modality,
        attributes: Vec<Attribute>,
        extracted: ExtractedRows,
        cancel: &CancellationToken,
    ) -> Result<IngestEnvelope, OrchestratorError> {
        let store = self.relational.as_ref().ok_or(OrchestratorError::NoRelationalStore)?;

        if cancel.is_cancelled() {
            return Err(OrchestratorError::Cancelled);
        }

        let outcome = execute(
            store,
            &self.catalog,
            &attributes,
            &extracted.rows,
            self.insert_batch_size,
            request.primary_key_hint,
        )
        .await?;

        info!(stage = "execute", table = %outcome.table.name, rows_inserted = outcome.insert.rows_inserted, "rows inserted");

        if cancel.is_cancelled() {
            return Err(OrchestratorError::Cancelled);
        }

        if !extracted.child_tables.is_empty() {
            let parent_pk_attr =
                outcome.table.primary_key().and_then(|pk| attributes.iter().find(|a| a.normalized == pk.name)).map(|a| a.original.as_str());
            self.persist_child_tables(store, &extracted.rows, parent_pk_attr, &extracted.child_tables, cancel).await?;
        }

        let summary_text = summarize_rows(&outcome.table.name, extracted.rows.len());
        let doc_outcome = self
            .documents
            .ingest(DocumentIngestRequest {
                path: request.path,
                tenant_id: request.tenant_id,
                modality,
                original_name: request.original_name,
                attributes: &[],
                collection_hint: Some(outcome.table.name.clone()),
                descriptive_text: Some(summary_text),
            })
            .await?;

        let graph_nodes = self.write_embeddings(&doc_outcome, modality, cancel).await;
        let storage_plan = self.plan_storage(request, modality, &doc_outcome.collection, &doc_outcome.storage_uri).await?;

        Ok(IngestEnvelope {
            status: IngestStatus::Completed,
            file_id: Some(doc_outcome.file_id),
            collection: Some(doc_outcome.collection.clone()),
            modality,
            chunk_count: u32::try_from(doc_outcome.chunks.len()).unwrap_or(u32::MAX),
            graph_nodes,
            mongo_collections: MongoCollections { files: "files".to_string(), chunks: doc_outcome.collection },
            storage_plan: Some(storage_plan),
            error: None,
            extra: BTreeMap::from([(
                "rows_inserted".to_string(),
                serde_json::Value::from(outcome.insert.rows_inserted),
            )]),
        })
    }

    /// Route deeply-nested child row sets (e.g. XML child elements too
    /// structured to flatten onto the parent row) through the same
    /// routing/evolution path as top-level rows, one table per child tag.
    /// Each child row's `parent_id` is resolved from the placeholder row
    /// index `RowExtractor` assigned it to the parent's actual primary-key
    /// value, when the parent's primary key is one of the attributes
    /// present on the incoming rows; otherwise the positional index is
    /// kept as a best-effort correlation key.
    async fn persist_child_tables(
        &self,
        store: &SqlStore,
        parent_rows: &[Row],
        parent_pk_attr: Option<&str>,
        child_tables: &BTreeMap<String, Vec<Row>>,
        cancel: &CancellationToken,
    ) -> Result<(), OrchestratorError> {
        for (child_tag, rows) in child_tables {
            if cancel.is_cancelled() {
                return Err(OrchestratorError::Cancelled);
            }
            let resolved_rows: Vec<Row> = rows.iter().map(|row| resolve_parent_id(row, parent_rows, parent_pk_attr)).collect();
            let child_attributes = attributes_from_rows(&resolved_rows);
            let child_outcome = execute(store, &self.catalog, &child_attributes, &resolved_rows, self.insert_batch_size, None).await?;
            info!(
                stage = "execute_child",
                child_tag = %child_tag,
                table = %child_outcome.table.name,
                rows_inserted = child_outcome.insert.rows_inserted,
                "child rows inserted"
            );
        }
        Ok(())
    }

    /// Persist through the document ingestor, embedding the result when an
    /// embedder is configured. `descriptive_text` carries a media caption
    /// when the caller already produced one (via the embedder's
    /// `encode_file`); `None` lets the text extractor run.
    async fn run_document_path(
        &self,
        request: &IngestRequest<'_>,
        modality: Modality,
        descriptive_text: Option<String>,
        attributes: &[String],
        cancel: &CancellationToken,
    ) -> Result<IngestEnvelope, OrchestratorError> {
        if cancel.is_cancelled() {
            return Err(OrchestratorError::Cancelled);
        }

        let descriptive_text = match descriptive_text {
            Some(text) => Some(text),
            None if modality.is_media_or_binary() => self.caption_for(request.path, modality).await,
            None => None,
        };

        let doc_outcome = self
            .documents
            .ingest(DocumentIngestRequest {
                path: request.path,
                tenant_id: request.tenant_id,
                modality,
                original_name: request.original_name,
                attributes,
                collection_hint: request.collection_hint.clone(),
                descriptive_text,
            })
            .await?;

        info!(stage = "persist", file_id = %doc_outcome.file_id, collection = %doc_outcome.collection, "catalog entry persisted");

        if cancel.is_cancelled() {
            return Err(OrchestratorError::Cancelled);
        }

        let graph_nodes = self.write_embeddings(&doc_outcome, modality, cancel).await;
        let storage_plan = self.plan_storage(request, modality, &doc_outcome.collection, &doc_outcome.storage_uri).await?;

        Ok(IngestEnvelope {
            status: IngestStatus::Completed,
            file_id: Some(doc_outcome.file_id),
            collection: Some(doc_outcome.collection.clone()),
            modality,
            chunk_count: u32::try_from(doc_outcome.chunks.len()).unwrap_or(u32::MAX),
            graph_nodes,
            mongo_collections: MongoCollections { files: "files".to_string(), chunks: doc_outcome.collection },
            storage_plan: Some(storage_plan),
            error: None,
            extra: BTreeMap::new(),
        })
    }

    /// Ask the embedder for a caption/transcript ahead of document
    /// persistence, for media files. Returns `None` (rather than failing
    /// the ingestion) when no embedder is configured or encoding fails —
    /// the text extractor's own empty-string fallback then takes over.
    async fn caption_for(&self, path: &Path, modality: Modality) -> Option<String> {
        let writer = self.embeddings.as_ref()?;
        let writer = writer.lock().await;
        if !writer.available() {
            return None;
        }
        match writer.embedder().encode_file(path, modality).await {
            Ok(encoding) => Some(encoding.caption),
            Err(e) => {
                warn!(error = %e, "file captioning failed; falling back to text extraction");
                None
            }
        }
    }

    /// Upsert the file's and its chunks' embeddings. Returns `[]` (never
    /// fails the ingestion) when no embedder is configured or it reports
    /// itself unavailable, per the writer's `available` contract.
    async fn write_embeddings(&self, outcome: &ingest_docs::DocumentIngestOutcome, modality: Modality, cancel: &CancellationToken) -> Vec<String> {
        if cancel.is_cancelled() {
            return Vec::new();
        }
        let Some(writer) = &self.embeddings else { return Vec::new() };
        let mut writer = writer.lock().await;
        if !writer.available() {
            return Vec::new();
        }
        match writer.write(&outcome.file_id, modality, &outcome.collection, &outcome.storage_uri, &outcome.summary, &outcome.chunks).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "vector index upsert failed; continuing with no graph nodes");
                Vec::new()
            }
        }
    }

    /// Run the built-in identity path planner (an external, LLM-backed
    /// planner is out of scope for this workspace), optionally physically
    /// relocating the already-copied object-store file to the planned path.
    async fn plan_storage(
        &self,
        request: &IngestRequest<'_>,
        modality: Modality,
        collection: &str,
        storage_uri: &str,
    ) -> Result<StoragePlan, OrchestratorError> {
        let planner = IdentityPathPlanner { modality: modality.as_str().to_string(), collection: collection.to_string() };
        let plan = planner.plan(collection, request.original_name);

        if !self.move_files {
            return Ok(StoragePlan { path: storage_uri.to_string(), moved_to: None });
        }

        let Some(object_store) = &self.object_store else {
            return Ok(StoragePlan { path: storage_uri.to_string(), moved_to: None });
        };

        let absolute = object_store.resolve(storage_uri);
        let moved_to = object_store.copy_into(Path::new(&absolute), &plan.path).await?;
        Ok(StoragePlan { path: storage_uri.to_string(), moved_to: Some(moved_to) })
    }
}

/// Build the attribute list for a freshly-extracted row set: every row
/// shares the same key set after normalization (an invariant of
/// [`Row`]), so the first row's keys are representative. Each attribute's
/// `inferred_type` is sampled from its non-null values across `rows` so
/// that matching against existing columns has real type information to
/// work with, not just names.
fn attributes_from_rows(rows: &[Row]) -> Vec<Attribute> {
    let Some(first) = rows.first() else { return Vec::new() };

    first
        .keys()
        .map(|key| {
            let mut attr = Attribute::new(key);
            let samples: Vec<&Scalar> = rows.iter().filter_map(|row| row.get(key)).filter(|s| !s.is_null()).collect();
            attr.inferred_type = Some(infer_column_type(&samples));
            attr
        })
        .collect()
}

/// Resolve a child row's `parent_id` (a positional index into `parent_rows`,
/// as assigned by extraction) to the parent's actual primary-key value when
/// `parent_pk_attr` names an attribute present on `parent_rows`.
fn resolve_parent_id(child_row: &Row, parent_rows: &[Row], parent_pk_attr: Option<&str>) -> Row {
    let mut row = child_row.clone();
    let Some(pk_attr) = parent_pk_attr else { return row };
    let Some(Scalar::Text(index_text)) = row.get("parent_id") else { return row };
    let Ok(index) = index_text.parse::<usize>() else { return row };
    if let Some(value) = parent_rows.get(index).and_then(|r| r.get(pk_attr)) {
        row.insert("parent_id".to_string(), value.clone());
    }
    row
}

/// A minimal descriptive summary for a batch of rows routed through the
/// relational path, used as the catalog entry's `descriptive_text`.
fn summarize_rows(table: &str, row_count: usize) -> String {
    format!("{row_count} row(s) ingested into {table}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_from_rows_uses_first_row_keys() {
        let row: Row = BTreeMap::from([("id".to_string(), Scalar::Int(1)), ("name".to_string(), Scalar::Text("a".into()))]);
        let attrs = attributes_from_rows(&[row]);
        let names: Vec<&str> = attrs.iter().map(|a| a.original.as_str()).collect();
        assert_eq!(names, vec!["id", "name"]);
    }

    #[test]
    fn attributes_from_rows_empty_for_no_rows() {
        assert!(attributes_from_rows(&[]).is_empty());
    }

    #[test]
    fn attributes_from_rows_samples_inferred_type() {
        let rows = vec![
            BTreeMap::from([("id".to_string(), Scalar::Int(1)), ("name".to_string(), Scalar::Text("a".into()))]),
            BTreeMap::from([("id".to_string(), Scalar::Int(2)), ("name".to_string(), Scalar::Text("b".into()))]),
        ];
        let attrs = attributes_from_rows(&rows);
        let id_attr = attrs.iter().find(|a| a.original == "id").unwrap();
        let name_attr = attrs.iter().find(|a| a.original == "name").unwrap();
        assert_eq!(id_attr.inferred_type.as_deref(), Some("integer"));
        assert_eq!(name_attr.inferred_type.as_deref(), Some("varchar(50)"));
    }

    #[test]
    fn summarize_rows_mentions_count_and_table() {
        assert_eq!(summarize_rows("products", 3), "3 row(s) ingested into products");
    }

    #[test]
    fn resolve_parent_id_substitutes_actual_primary_key_value() {
        let parent_rows =
            vec![BTreeMap::from([("order_id".to_string(), Scalar::Text("ord-9".into()))]), BTreeMap::from([("order_id".to_string(), Scalar::Text("ord-10".into()))])];
        let child_row = BTreeMap::from([("sku".to_string(), Scalar::Text("a".into())), ("parent_id".to_string(), Scalar::Text("1".into()))]);

        let resolved = resolve_parent_id(&child_row, &parent_rows, Some("order_id"));
        assert_eq!(resolved.get("parent_id"), Some(&Scalar::Text("ord-10".into())));
    }

    #[test]
    fn resolve_parent_id_keeps_positional_index_when_no_pk_attribute() {
        let parent_rows = vec![BTreeMap::from([("name".to_string(), Scalar::Text("a".into()))])];
        let child_row = BTreeMap::from([("parent_id".to_string(), Scalar::Text("0".into()))]);

        let resolved = resolve_parent_id(&child_row, &parent_rows, None);
        assert_eq!(resolved.get("parent_id"), Some(&Scalar::Text("0".into())));
    }
}
