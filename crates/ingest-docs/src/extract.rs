//! `TextExtractor`: the capability that turns a file on disk into a text
//! representation for summarization, collection inference, and chunking.
//!
//! The bundled [`LossyTextExtractor`] handles plain text, markdown, and any
//! other file whose bytes happen to decode reasonably as UTF-8 — the same
//! scope the pipeline's text extraction step covers today. Media files
//! (image/video/audio) don't go through this trait at all: their "text" is
//! the caption produced by the multimodal embedder, supplied directly to
//! [`crate::ingestor::DocumentIngestor::ingest`].

use std::path::Path;

use crate::error::DocsError;

/// A capability for turning a file's bytes into text.
pub trait TextExtractor: Send + Sync {
    /// Extract `path`'s text content. Never fails outright on decode
    /// trouble — lossy decoding replaces invalid sequences rather than
    /// erroring — but does fail on I/O errors (file missing, unreadable).
    ///
    /// # Errors
    ///
    /// Returns [`DocsError::Extract`] if `path` cannot be read.
    fn extract(&self, path: &Path) -> Result<String, DocsError>;
}

/// Extensions this extractor accepts; anything else yields `""` rather
/// than raising, per the capability's contract.
const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "csv", "json", "xml", "yaml", "yml", "html", "htm", "pdf", "docx"];

/// Reads a file's bytes and lossily decodes them as UTF-8. No PDF/DOCX
/// parsing is performed; those formats fall through to whatever bytes
/// happen to look like text in them, same as plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct LossyTextExtractor;

impl TextExtractor for LossyTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, DocsError> {
        let supported = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if !supported {
            return Ok(String::new());
        }
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
