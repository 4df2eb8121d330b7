//! AttributeMatcher.

use std::collections::BTreeMap;

use ingest_core::attribute::{is_id_attribute, normalize};
use ingest_core::model::{Attribute, ColumnDescriptor};

use crate::similarity::combined_score;

/// Minimum combined score for a regular attribute to claim an existing
/// column.
const CLAIM_THRESHOLD: f64 = 0.6;

/// The outcome of matching a set of incoming attributes against an
/// existing table's columns.
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    /// Incoming attribute (original name) → existing column name.
    pub mapping: BTreeMap<String, String>,
    /// Incoming attributes (normalized) with no acceptable match.
    pub new_fields: Vec<String>,
    /// Fraction of *regular* incoming attributes that matched.
    pub score: f64,
}

/// Match `incoming` attributes against `existing` columns.
#[must_use]
pub fn match_attributes(incoming: &[Attribute], existing: &[ColumnDescriptor]) -> MatchResult {
    let mut mapping = BTreeMap::new();
    let mut claimed: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();

    let (incoming_ids, incoming_regular): (Vec<&Attribute>, Vec<&Attribute>) =
    incoming.iter().partition(|a| a.is_id_attribute());
    let existing_ids: Vec<&ColumnDescriptor> =
    existing.iter().filter(|c| is_id_attribute(&c.name)).collect();
    let existing_regular: Vec<&ColumnDescriptor> =
    existing.iter().filter(|c| !is_id_attribute(&c.name)).collect();

    match_ids(&incoming_ids, &existing_ids, &mut mapping, &mut claimed);

    let mut new_fields = Vec::new();
    for attr in &incoming_regular {
        if let Some(target) = best_unclaimed_match(attr, &existing_regular, &claimed) {
            claimed.insert(target.clone());
            mapping.insert(attr.original.clone(), target);
        } else {
            new_fields.push(attr.normalized.clone());
        }
    }

    let matched_regular = incoming_regular
    .iter()
    .filter(|a| mapping.contains_key(&a.original))
    .count();
    let score = if incoming_regular.is_empty() {
        1.0
    } else {
        matched_regular as f64 / incoming_regular.len() as f64
    };

    MatchResult { mapping, new_fields, score }
}

/// ID attributes are matched by: (a) exact normalized match; (b) if both
/// sides have exactly one ID attribute, match them unconditionally
/// (same-concept rule); (c) substring containment on the token `id`.
fn match_ids(
    incoming: &[&Attribute],
    existing: &[&ColumnDescriptor],
    mapping: &mut BTreeMap<String, String>,
    claimed: &mut std::collections::BTreeSet<String>,
) {
    if incoming.len() == 1 && existing.len() == 1 {
        mapping.insert(incoming[0].original.clone(), existing[0].name.clone());
        claimed.insert(existing[0].name.clone());
        return;
    }

    for attr in incoming {
        if claimed.contains(&attr.normalized) {
            continue;
        }
        if let Some(exact) = existing.iter().find(|c| !claimed.contains(&c.name) && c.name == attr.normalized) {
            mapping.insert(attr.original.clone(), exact.name.clone());
            claimed.insert(exact.name.clone());
            continue;
        }
        if let Some(substr) = existing.iter().find(|c| {
                !claimed.contains(&c.name) && (c.name.contains(&attr.normalized) || attr.normalized.contains(&c.name))
        }) {
            mapping.insert(attr.original.clone(), substr.name.clone());
            claimed.insert(substr.name.clone());
        }
    }
}

fn best_unclaimed_match(
    attr: &Attribute,
    candidates: &[&ColumnDescriptor],
    claimed: &std::collections::BTreeSet<String>,
) -> Option<String> {
    candidates
    .iter()
    .filter(|c| !claimed.contains(&c.name))
    .map(|c| {
            let score = combined_score(&attr.original, &c.name, attr.inferred_type.as_deref(), &c.pg_type);
            (c.name.clone(), score)
    })
    .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    .filter(|(_, score)| *score >= CLAIM_THRESHOLD)
    .map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, pg_type: &str, primary: bool) -> ColumnDescriptor {
        ColumnDescriptor { name: name.into(), pg_type: pg_type.into(), nullable: !primary, is_primary: primary }
    }

    #[test]
    fn exact_name_matches_claim_column() {
        let incoming = vec![Attribute::new("name"), Attribute::new("price")];
        let existing = vec![col("name", "varchar(100)", false), col("price", "real", false)];
        let result = match_attributes(&incoming, &existing);
        assert_eq!(result.mapping.get("name"), Some(&"name".to_string()));
        assert_eq!(result.score, 1.0);
        assert!(result.new_fields.is_empty());
    }

    #[test]
    fn unmatched_attribute_becomes_new_field() {
        let incoming = vec![Attribute::new("name"), Attribute::new("discount_code")];
        let existing = vec![col("name", "varchar(100)", false)];
        let result = match_attributes(&incoming, &existing);
        assert_eq!(result.new_fields, vec!["discount_code"]);
        assert_eq!(result.score, 0.5);
    }

    #[test]
    fn single_id_on_both_sides_matches_unconditionally() {
        let incoming = vec![Attribute::new("product_id")];
        let existing = vec![col("sku_id", "integer", true)];
        let result = match_attributes(&incoming, &existing);
        assert_eq!(result.mapping.get("product_id"), Some(&"sku_id".to_string()));
    }

    #[test]
    fn id_attributes_excluded_from_score_denominator() {
        let incoming = vec![Attribute::new("id"), Attribute::new("totally_unmatched_field")];
        let existing = vec![col("id", "integer", true)];
        let result = match_attributes(&incoming, &existing);
        // Only one regular attribute, unmatched: score is 0/1, not diluted
        // by the id attribute.
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn synonym_match_claims_column() {
        let incoming = vec![Attribute::new("cost")];
        let existing = vec![col("price", "real", false)];
        let result = match_attributes(&incoming, &existing);
        assert_eq!(result.mapping.get("cost"), Some(&"price".to_string()));
    }
}
