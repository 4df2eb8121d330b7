//! HTML row extraction: the first `<table>` with `<th>` headers.
//!
//! No HTML5-conformant parser is pulled in for this — the input contract is
//! narrow (one well-formed data table), so a small tag-stream scanner over
//! the raw bytes suffices and keeps the dependency footprint in line with
//! the rest of this crate's format-specific, purpose-built extractors.

use ingest_core::model::{Row, Scalar};

use super::ExtractedRows;
use crate::error::ExtractError;

pub(super) fn extract(bytes: &[u8]) -> Result<ExtractedRows, ExtractError> {
    let text = std::str::from_utf8(bytes)
    .map_err(|e| ExtractError::Malformed { format: "html", message: e.to_string() })?;

    let table = first_table(text).ok_or(ExtractError::NoHtmlTable)?;
    let header_row = first_row_with_cells(table, "th").ok_or(ExtractError::NoHtmlTable)?;
    let headers: Vec<String> = cells(header_row, "th");
    if headers.is_empty() {
        return Err(ExtractError::NoHtmlTable);
    }

    let mut rows = Vec::new();
    for tr in all_tags(table, "tr") {
        let values = cells(tr, "td");
        if values.is_empty() {
            continue;
        }
        let mut row: Row = Row::new();
        for (name, value) in headers.iter().zip(values.iter()) {
            row.insert(name.clone(), scalar_from_cell(value));
        }
        rows.push(row);
    }

    Ok(ExtractedRows { rows, child_tables: Default::default() })
}

fn scalar_from_cell(value: &str) -> Scalar {
    if value.is_empty() { Scalar::Null } else { Scalar::Text(value.to_string()) }
}

/// Find the first `<table>...</table>` span (non-greedy on the closing tag,
/// case-insensitive, ignoring nested tables for simplicity).
fn first_table(text: &str) -> Option<&str> {
    let lower = text.to_ascii_lowercase();
    let start = lower.find("<table")?;
    let body_start = lower[start..].find('>')? + start + 1;
    let end = lower[body_start..].find("</table>")? + body_start;
    Some(&text[body_start..end])
}

fn all_tags<'a>(text: &'a str, tag: &str) -> Vec<&'a str> {
    let lower = text.to_ascii_lowercase();
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut spans = Vec::new();
    let mut pos = 0;
    while let Some(rel_start) = lower[pos..].find(&open) {
        let start = pos + rel_start;
        let Some(rel_tag_end) = lower[start..].find('>') else { break };
        let body_start = start + rel_tag_end + 1;
        let Some(rel_close) = lower[body_start..].find(&close) else { break };
        let body_end = body_start + rel_close;
        spans.push(&text[body_start..body_end]);
        pos = body_end + close.len();
    }
    spans
}

fn first_row_with_cells<'a>(table: &'a str, cell_tag: &str) -> Option<&'a str> {
    all_tags(table, "tr").into_iter().find(|row| !cells(row, cell_tag).is_empty())
}

fn cells(row: &str, cell_tag: &str) -> Vec<String> {
    all_tags(row, cell_tag).into_iter().map(strip_tags).collect()
}

fn strip_tags(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for ch in fragment.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_table_with_th_headers() {
        let html = r#"
        <html><body>
        <table>
        <tr><th>name</th><th>price</th></tr>
        <tr><td>widget</td><td>9.99</td></tr>
        <tr><td>gadget</td><td>19.99</td></tr>
        </table>
        </body></html>
        "#;
        let extracted = extract(html.as_bytes()).unwrap();
        assert_eq!(extracted.rows.len(), 2);
        assert_eq!(extracted.rows[0].get("name"), Some(&Scalar::Text("widget".into())));
    }

    #[test]
    fn table_without_th_is_rejected() {
        let html = "<table><tr><td>1</td><td>2</td></tr></table>";
        let err = extract(html.as_bytes()).unwrap_err();
        assert!(matches!(err, ExtractError::NoHtmlTable));
    }

    #[test]
    fn no_table_at_all_is_rejected() {
        let err = extract(b"<html><body>hello</body></html>").unwrap_err();
        assert!(matches!(err, ExtractError::NoHtmlTable));
    }
}
