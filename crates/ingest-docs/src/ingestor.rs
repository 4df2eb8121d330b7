//! `DocumentIngestor`: the document/media persistence path. Extracts text,
//! builds a summary, infers a collection, chunks the text, and persists a
//! file-metadata document plus its chunk documents — copying the source
//! file into the object store along the way.

use std::path::Path;

use chrono::Utc;
use ingest_core::ids::{PREFIX_FILE, generate_id};
use ingest_core::model::{Chunk, FileRecord, GraphNode, Modality};
use ingest_store::{Document, DocumentStore, ObjectStore};

use crate::collection::infer_collection;
use crate::error::DocsError;
use crate::extract::TextExtractor;
use crate::summary::{build_summary, truncate_chars};

const FILES_COLLECTION: &str = "files";
/// How much of the extracted text feeds collection-hint keyword matching.
const COLLECTION_SAMPLE_CHARS: usize = 200;
/// Cap on the catalog's short preview field, independent of the longer
/// summary used for collection inference and as the descriptive text.
const SUMMARY_PREVIEW_MAX_CHARS: usize = 500;

/// Input to a single [`DocumentIngestor::ingest`] call.
pub struct DocumentIngestRequest<'a> {
    pub path: &'a Path,
    pub tenant_id: &'a str,
    pub modality: Modality,
    pub original_name: &'a str,
    pub attributes: &'a [String],
    /// Caller-supplied collection hint, bypassing keyword inference.
    pub collection_hint: Option<String>,
    /// For media files, the caption/transcript produced by a multimodal
    /// encoder. When `None`, text is extracted from `path` directly.
    pub descriptive_text: Option<String>,
}

/// What a successful [`DocumentIngestor::ingest`] call produced, ready to
/// be handed to an embedding writer and folded into an ingestion envelope.
#[derive(Debug, Clone)]
pub struct DocumentIngestOutcome {
    pub file_id: String,
    pub collection: String,
    pub storage_uri: String,
    pub summary: String,
    pub full_text: String,
    pub chunks: Vec<Chunk>,
}

pub struct DocumentIngestor<E: TextExtractor> {
    extractor: E,
    document_store: Option<DocumentStore>,
    object_store: Option<ObjectStore>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl<E: TextExtractor> DocumentIngestor<E> {
    #[must_use]
    pub const fn new(
        extractor: E,
        document_store: Option<DocumentStore>,
        object_store: Option<ObjectStore>,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Self {
        Self { extractor, document_store, object_store, chunk_size, chunk_overlap }
    }

    /// Run the document path end to end.
    ///
    /// # Errors
    ///
    /// Returns [`DocsError::Extract`] if text extraction fails,
    /// [`DocsError::Store`] if the object-store copy or document
    /// persistence fails, or [`DocsError::Encode`] if a catalog entry
    /// cannot be serialized.
    pub async fn ingest(&self, request: DocumentIngestRequest<'_>) -> Result<DocumentIngestOutcome, DocsError> {
        let full_text = match request.descriptive_text {
            Some(text) => text,
            None => self.extractor.extract(request.path)?,
        };

        let summary = build_summary(&full_text, request.original_name);
        let sample: String = full_text.chars().take(COLLECTION_SAMPLE_CHARS).collect();
        let collection = request
        .collection_hint
        .unwrap_or_else(|| infer_collection(request.original_name, request.attributes, &sample));

        let file_id = generate_id(PREFIX_FILE);
        let storage_uri = self.store_file(request.path, request.modality, &collection, request.original_name).await?;

        let extension = request.path.extension().and_then(|e| e.to_str()).unwrap_or_default().to_string();
        let size_bytes = tokio::fs::metadata(request.path).await.map(|m| m.len()).unwrap_or(0);

        let record = FileRecord {
            file_id: file_id.clone(),
            tenant_id: request.tenant_id.to_string(),
            original_name: request.original_name.to_string(),
            extension,
            size_bytes,
            storage_uri: storage_uri.clone(),
            modality: request.modality,
            collection_hint: collection.clone(),
            summary_preview: truncate_chars(&summary, SUMMARY_PREVIEW_MAX_CHARS),
            descriptive_text: full_text.clone(),
            extra: std::collections::BTreeMap::new(),
            created_at: Utc::now(),
        };

        let chunk_texts = ingest_parser::chunk_text(&full_text, self.chunk_size, self.chunk_overlap);
        let chunks: Vec<Chunk> = chunk_texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk {
            file_id: file_id.clone(),
            chunk_index: u32::try_from(index).unwrap_or(u32::MAX),
            text,
            chunk_size: self.chunk_size,
            tenant_id: request.tenant_id.to_string(),
        })
        .collect();

        if let Some(store) = &self.document_store {
            store.insert_one(FILES_COLLECTION, Document { id: file_id.clone(), body: serde_json::to_value(&record)? }).await?;

            if !chunks.is_empty() {
                let docs = chunks
                .iter()
                .map(|chunk| {
                    Ok(Document {
                        id: GraphNode::chunk_key(&file_id, chunk.chunk_index),
                        body: serde_json::to_value(chunk)?,
                    })
                })
                .collect::<Result<Vec<_>, serde_json::Error>>()?;
                store.insert_many(&collection, docs).await?;
            }
        }

        Ok(DocumentIngestOutcome { file_id, collection, storage_uri, summary, full_text, chunks })
    }

    async fn store_file(&self, path: &Path, modality: Modality, collection: &str, original_name: &str) -> Result<String, DocsError> {
        let Some(object_store) = &self.object_store else {
            return Ok(path.display().to_string());
        };
        let destination = format!("{}/{collection}/{original_name}", modality.as_str());
        Ok(object_store.copy_into(path, &destination).await?)
    }
}
