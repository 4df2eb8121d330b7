//! FileTypeDetector.
//!
//! Maps a path, an optional MIME guess, and a bounded byte prefix to a
//! [`DetectedType`]. Never fails: an unrecognized or undecodable input
//! falls through to [`DetectedType::Text`] then [`DetectedType::Binary`].

use std::path::Path;

/// The file type produced by detection, consumed downstream to decide
/// extraction strategy and routing. This is finer-grained than
/// [`ingest_core::model::Modality`], which is the coarser catalog-level tag
/// the orchestrator assigns after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectedType {
    Tabular,
    Json,
    Xml,
    Yaml,
    Html,
    Text,
    Media,
    Binary,
}

impl DetectedType {
    /// Whether this type is a candidate for structured classification,
    /// as opposed to going straight to the document/media path.
    #[must_use]
    pub const fn is_structured_candidate(self) -> bool {
        matches!(self, Self::Tabular | Self::Json | Self::Xml | Self::Yaml | Self::Html)
    }
}

/// Bound on how much of the file we attempt to decode as UTF-8 when no
/// extension or MIME hint resolved the type.
const UTF8_PROBE_LIMIT: usize = 8192;

/// Detect a file's type from its path, an optional MIME guess, and a byte
/// prefix (the caller need not hand over the whole file; [`UTF8_PROBE_LIMIT`]
/// bytes is plenty).
#[must_use]
pub fn detect(path: &Path, mime_hint: Option<&str>, prefix: &[u8]) -> DetectedType {
    if let Some(mime) = mime_hint {
        if let Some(t) = from_mime_prefix(mime) {
            return t;
        }
    }

    let ext = path
    .extension()
    .and_then(|e| e.to_str())
    .map(str::to_ascii_lowercase);
    if let Some(ext) = ext.as_deref() {
        if let Some(t) = from_extension(ext) {
            return t;
        }
    }

    let probe = &prefix[..prefix.len().min(UTF8_PROBE_LIMIT)];
    if std::str::from_utf8(probe).is_ok() {
        DetectedType::Text
    } else {
        DetectedType::Binary
    }
}

fn from_mime_prefix(mime: &str) -> Option<DetectedType> {
    let prefix = mime.split('/').next()?;
    matches!(prefix, "image" | "video" | "audio").then_some(DetectedType::Media)
}

fn from_extension(ext: &str) -> Option<DetectedType> {
    Some(match ext {
            "csv" | "tsv" | "xlsx" => DetectedType::Tabular,
            "json" => DetectedType::Json,
            "xml" => DetectedType::Xml,
            "yaml" | "yml" => DetectedType::Yaml,
            "html" | "htm" => DetectedType::Html,
            "txt" | "md" | "log" | "pdf" | "docx" | "ini" => DetectedType::Text,
            _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_prefix_wins_over_extension() {
        let p = Path::new("photo.json");
        assert_eq!(detect(&p, Some("image/jpeg"), b"{}"), DetectedType::Media);
    }

    #[test]
    fn extension_map_covers_structured_types() {
        assert_eq!(detect(Path::new("a.csv"), None, b""), DetectedType::Tabular);
        assert_eq!(detect(Path::new("a.xlsx"), None, b""), DetectedType::Tabular);
        assert_eq!(detect(Path::new("a.json"), None, b""), DetectedType::Json);
        assert_eq!(detect(Path::new("a.xml"), None, b""), DetectedType::Xml);
        assert_eq!(detect(Path::new("a.yaml"), None, b""), DetectedType::Yaml);
        assert_eq!(detect(Path::new("a.html"), None, b""), DetectedType::Html);
    }

    #[test]
    fn document_extensions_fall_to_text() {
        assert_eq!(detect(Path::new("a.pdf"), None, b""), DetectedType::Text);
        assert_eq!(detect(Path::new("a.docx"), None, b""), DetectedType::Text);
        assert_eq!(detect(Path::new("a.md"), None, b""), DetectedType::Text);
    }

    #[test]
    fn unknown_extension_probes_utf8() {
        assert_eq!(detect(Path::new("a.xyz"), None, b"hello world"), DetectedType::Text);
        assert_eq!(detect(Path::new("a.xyz"), None, &[0xff, 0xfe, 0x00]), DetectedType::Binary);
    }

    #[test]
    fn structured_candidate_excludes_text_media_binary() {
        assert!(DetectedType::Json.is_structured_candidate());
        assert!(!DetectedType::Text.is_structured_candidate());
        assert!(!DetectedType::Media.is_structured_candidate());
        assert!(!DetectedType::Binary.is_structured_candidate());
    }
}
