//! XML row extraction: repeating sibling elements under the root
//! become rows, with attributes and leaf text flattened into scalar
//! columns. An element with element children of its own (rather than just
//! text) is too deeply nested to flatten; its children become a child
//! table keyed by `parent_id`, named after the nested element's tag.

use std::collections::BTreeMap;

use ingest_core::model::{Row, Scalar};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use super::ExtractedRows;
use crate::error::ExtractError;

#[derive(Debug, Default)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

pub(super) fn extract(bytes: &[u8]) -> Result<ExtractedRows, ExtractError> {
    let root = parse_tree(bytes)?;

    let row_tag = most_common_child_tag(&root).ok_or(ExtractError::NoXmlRows)?;
    let row_elements: Vec<&Element> = root.children.iter().filter(|c| c.name == row_tag).collect();
    if row_elements.len() < 2 {
        return Err(ExtractError::NoXmlRows);
    }

    let mut rows = Vec::with_capacity(row_elements.len());
    let mut child_tables: BTreeMap<String, Vec<Row>> = BTreeMap::new();

    for (index, element) in row_elements.iter().enumerate() {
        let parent_id = index.to_string();
        let mut row: Row = Row::new();
        for (key, value) in &element.attrs {
            row.insert(key.clone(), Scalar::Text(value.clone()));
        }
        for child in &element.children {
            if child.children.is_empty() {
                row.insert(child.name.clone(), leaf_scalar(child));
            } else {
                let table = child_tables.entry(child.name.clone()).or_default();
                let mut child_row = flatten_leaf(child);
                child_row.insert("parent_id".into(), Scalar::Text(parent_id.clone()));
                table.push(child_row);
            }
        }
        if !element.text.trim().is_empty() && element.children.is_empty() {
            row.insert("text".into(), Scalar::Text(element.text.trim().to_string()));
        }
        rows.push(row);
    }

    Ok(ExtractedRows { rows, child_tables })
}

fn leaf_scalar(element: &Element) -> Scalar {
    let text = element.text.trim();
    if text.is_empty() { Scalar::Null } else { Scalar::Text(text.to_string()) }
}

fn flatten_leaf(element: &Element) -> Row {
    let mut row: Row = Row::new();
    for (key, value) in &element.attrs {
        row.insert(key.clone(), Scalar::Text(value.clone()));
    }
    for child in &element.children {
        row.insert(child.name.clone(), leaf_scalar(child));
    }
    if row.is_empty() {
        row.insert("value".into(), leaf_scalar(element));
    }
    row
}

/// The root's most frequently repeated direct child tag, i.e. the rows.
fn most_common_child_tag(root: &Element) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for child in &root.children {
        *counts.entry(child.name.as_str()).or_insert(0) += 1;
    }
    counts.into_iter().max_by_key(|(_, count)| *count).map(|(name, _)| name.to_string())
}

fn parse_tree(bytes: &[u8]) -> Result<Element, ExtractError> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = vec![Element::default()];
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(tag)) => {
                let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
                let attrs = tag
                .attributes()
                .filter_map(Result::ok)
                .map(|a| {
                        let key = String::from_utf8_lossy(a.key.as_ref()).into_owned();
                        let value = a.unescape_value().unwrap_or_default().into_owned();
                        (key, value)
                })
                .collect();
                stack.push(Element { name, attrs, children: Vec::new(), text: String::new() });
            }
            Ok(Event::Empty(tag)) => {
                let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
                let attrs = tag
                .attributes()
                .filter_map(Result::ok)
                .map(|a| {
                        let key = String::from_utf8_lossy(a.key.as_ref()).into_owned();
                        let value = a.unescape_value().unwrap_or_default().into_owned();
                        (key, value)
                })
                .collect();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Element { name, attrs, children: Vec::new(), text: String::new() });
                }
            }
            Ok(Event::Text(text)) => {
                let decoded = text.unescape().unwrap_or_default().into_owned();
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&decoded);
                }
            }
            Ok(Event::End(_)) => {
                if stack.len() > 1 {
                    let finished = stack.pop().expect("stack checked non-empty above");
                    stack.last_mut().expect("root never popped").children.push(finished);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ExtractError::Malformed { format: "xml", message: e.to_string() }),
        }
        buf.clear();
    }

    stack.into_iter().next().ok_or(ExtractError::NoXmlRows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeating_siblings_become_rows() {
        let xml = br#"<root><item id="1"><name>a</name></item><item id="2"><name>b</name></item></root>"#;
        let extracted = extract(xml).unwrap();
        assert_eq!(extracted.rows.len(), 2);
        assert_eq!(extracted.rows[0].get("id"), Some(&Scalar::Text("1".into())));
        assert_eq!(extracted.rows[0].get("name"), Some(&Scalar::Text("a".into())));
    }

    #[test]
    fn nested_children_become_child_table() {
        let xml = br#"<root>
        <order id="1"><line sku="a" qty="2"/><line sku="b" qty="1"/></order>
        <order id="2"><line sku="c" qty="5"/><line sku="d" qty="9"/></order>
        </root>"#;
        let extracted = extract(xml).unwrap();
        assert_eq!(extracted.rows.len(), 2);
        let lines = extracted.child_tables.get("line").expect("line child table present");
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().any(|r| r.get("parent_id") == Some(&Scalar::Text("0".into()))));
    }

    #[test]
    fn no_repeating_siblings_is_an_error() {
        let xml = br#"<root><a>1</a><b>2</b></root>"#;
        let err = extract(xml).unwrap_err();
        assert!(matches!(err, ExtractError::NoXmlRows));
    }
}
