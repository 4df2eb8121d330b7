//! Resolves a [`Modality`] from a detected file type and its extension.
//!
//! [`ingest_parser::detect`] only distinguishes a generic
//! [`DetectedType::Media`] bucket; it has no reason to know the richer
//! image/video/audio split the catalog wants. This module closes that gap
//! with the same extension sets the original classification layer used to
//! separate media files bound for the CLIP encoder from everything else.

use ingest_core::model::Modality;
use ingest_parser::detect::DetectedType;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "ogg", "m4a"];

/// Resolve the catalog-level modality for a file already assigned a
/// [`DetectedType`] and extension. Structured-candidate types resolve to
/// [`Modality::Tabular`] provisionally — the orchestrator may still demote
/// a file to [`Modality::Document`] after [`ingest_match::classify`] scores
/// it `NoSQL`.
#[must_use]
pub fn resolve(detected: DetectedType, extension: &str) -> Modality {
    match detected {
        DetectedType::Tabular | DetectedType::Json | DetectedType::Xml | DetectedType::Yaml | DetectedType::Html => {
            Modality::Tabular
        }
        DetectedType::Text => Modality::Document,
        DetectedType::Media => media_modality(extension),
        DetectedType::Binary => Modality::Binary,
    }
}

fn media_modality(extension: &str) -> Modality {
    let ext = extension.to_ascii_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Modality::Image
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Modality::Video
    } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        Modality::Audio
    } else {
        // A MIME-sniffed media file whose extension isn't in any of the
        // three sets (rare, but `detect` can reach `Media` via MIME prefix
        // alone); images are the most common case so default there.
        Modality::Image
    }
}

/// Parse a caller-supplied modality hint string (the `hints.modality` field
/// of the ingestion entry point) into a [`Modality`], if it names one.
#[must_use]
pub fn parse_hint(hint: &str) -> Option<Modality> {
    match hint.to_ascii_lowercase().as_str() {
        "tabular" => Some(Modality::Tabular),
        "document" => Some(Modality::Document),
        "image" => Some(Modality::Image),
        "video" => Some(Modality::Video),
        "audio" => Some(Modality::Audio),
        "binary" => Some(Modality::Binary),
        _ => None,
    }
}
