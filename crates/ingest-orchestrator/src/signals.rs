//! Derives [`ClassifierSignals`] by observing a file's detected type and
//! extracted payload.
//!
//! [`ingest_match::classify`] is deliberately decoupled from any particular
//! parser: it scores signals it is handed, rather than re-deriving them
//! from raw bytes itself. This module is that observer, living in the
//! orchestrator the same way the classifier's own module doc says callers
//! should.

use std::collections::BTreeSet;

use ingest_core::model::{Attribute, Scalar};
use ingest_match::classify::ClassifierSignals;
use ingest_parser::detect::DetectedType;
use ingest_parser::extract::ExtractedRows;

/// Any string field sampled longer than this favors the document/vector
/// path (free text masquerading as a column).
const LONG_STRING_THRESHOLD: usize = 500;

/// Minimum length, in characters, for unstructured text to count as the
/// "plain text, no delimiter regularity" signal.
const PLAIN_TEXT_MIN_CHARS: usize = 5000;

/// Build signals for a file that extracted successfully as one of the
/// structured-candidate types (tabular, JSON, XML, YAML, HTML).
#[must_use]
pub fn structured_signals(detected: DetectedType, extracted: &ExtractedRows, attributes: &[Attribute]) -> ClassifierSignals {
    let uniform_keys = has_uniform_keys(extracted);
    let is_json = matches!(detected, DetectedType::Json);
    let is_xml = matches!(detected, DetectedType::Xml);

    ClassifierSignals {
        tabular_container: matches!(detected, DetectedType::Tabular),
        json_array_uniform_keys: is_json && uniform_keys,
        json_array_divergent_keys: is_json && !uniform_keys && extracted.rows.len() > 1,
        // XML tracks genuinely deep nesting as child tables directly; JSON
        // flattens nested values into stringified scalars (`Scalar` has no
        // array/object variant), so a collapsed array/object is recognized
        // by its leading bracket/brace instead.
        nested_depth_ge_1: !extracted.child_tables.is_empty() || (is_json && has_nested_value(extracted)),
        has_id_like_attribute: attributes.iter().any(Attribute::is_id_attribute),
        long_string_field: has_long_string_field(extracted),
        // The HTML extractor itself requires `<th>` headers to succeed, so
        // any successful `Html` extraction already satisfies this signal.
        html_table_with_th: matches!(detected, DetectedType::Html),
        plain_text_no_delimiter: false,
        xml_uniform_siblings: is_xml && uniform_keys,
    }
}

/// Build signals for a file that fell through to plain text: a re-attempted
/// tabular parse failed, so the only remaining evidence is length.
#[must_use]
pub fn plain_text_signals(char_len: usize) -> ClassifierSignals {
    ClassifierSignals { plain_text_no_delimiter: char_len >= PLAIN_TEXT_MIN_CHARS, ..ClassifierSignals::default() }
}

fn has_uniform_keys(extracted: &ExtractedRows) -> bool {
    let Some(first) = extracted.rows.first() else { return true };
    let keys: BTreeSet<&String> = first.keys().collect();
    extracted.rows.iter().all(|row| row.keys().collect::<BTreeSet<&String>>() == keys)
}

fn has_nested_value(extracted: &ExtractedRows) -> bool {
    extracted.rows.iter().flat_map(std::collections::BTreeMap::values).any(|value| match value {
        Scalar::Text(s) => s.starts_with('[') || s.starts_with('{'),
        _ => false,
    })
}

fn has_long_string_field(extracted: &ExtractedRows) -> bool {
    extracted
    .rows
    .iter()
    .flat_map(std::collections::BTreeMap::values)
    .any(|value| matches!(value, Scalar::Text(s) if s.chars().count() > LONG_STRING_THRESHOLD))
}
