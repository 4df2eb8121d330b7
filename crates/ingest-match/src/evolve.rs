//! SchemaEvolutionEngine.

use std::collections::{BTreeMap, HashSet};

use ingest_core::model::Attribute;

use crate::catalog::SharedCatalog;
use crate::error::MatchError;
use crate::matcher::{MatchResult, match_attributes};
use crate::similarity::name_similarity;

/// Minimum semantic similarity for a table to be promoted to a candidate
/// during the semantic retrieval pass.
const SEMANTIC_PROMOTION_THRESHOLD: f64 = 0.4;

/// How many top-ranked candidates get the full `AttributeMatcher` treatment.
const TOP_N_CANDIDATES: usize = 3;

const SMALL_ATTRIBUTE_SET: usize = 10;
const SMALL_SET_THRESHOLD: f64 = 0.6;
const LARGE_SET_THRESHOLD: f64 = 0.8;

const EVOLVED_TABLE_MIN_SCORE: f64 = 0.5;
const EVOLVED_TABLE_MAX_NEW_FIELDS: usize = 3;

const SYNTHESIZED_NAME_MAX_LEN: usize = 50;

/// The decision reached for one set of incoming attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    SameTable { table: String },
    EvolvedTable { table: String, new_fields: Vec<String> },
    EvolvedTableJsonb { table: String, new_fields: Vec<String> },
    NewTable { name: String },
}

#[derive(Debug, Clone)]
pub struct EvolutionResult {
    pub decision: Decision,
    /// Incoming attribute (original name) → target column name, empty for
    /// `NewTable`.
    pub mapping: BTreeMap<String, String>,
}

/// Evaluate where `incoming` attributes belong.
///
/// # Errors
///
/// Returns [`MatchError::Empty`] if `incoming` has no attributes at all.
pub async fn evaluate(catalog: &SharedCatalog, incoming: &[Attribute]) -> Result<EvolutionResult, MatchError> {
    if incoming.is_empty() {
        return Err(MatchError::Empty);
    }

    let best = catalog
        .read(|snapshot| {
            let mut candidate_names: Vec<String> =
                snapshot.candidates_by_index(incoming).into_iter().map(|(name, _)| name).collect();

            let already_candidate: HashSet<String> = candidate_names.iter().cloned().collect();
            let mut semantic: Vec<(String, usize)> = Vec::new();
            for table in snapshot.tables_excluding(&already_candidate) {
                let mut hits = 0;
                for attr in incoming.iter().filter(|a| !a.is_id_attribute()) {
                    let promoted = table
                        .regular_columns()
                        .any(|col| name_similarity(&attr.original, &col.name) >= SEMANTIC_PROMOTION_THRESHOLD);
                    if promoted {
                        hits += 1;
                    }
                }
                if hits > 0 {
                    semantic.push((table.name.clone(), hits));
                }
            }
            semantic.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            candidate_names.extend(semantic.into_iter().map(|(name, _)| name));

            candidate_names
                .into_iter()
                .take(TOP_N_CANDIDATES)
                .filter_map(|name| {
                    let table = snapshot.get(&name)?;
                    let result = match_attributes(incoming, &table.columns);
                    Some((name, result))
                })
                .max_by(|(_, a), (_, b)| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
        })
        .await;

    let threshold = if incoming.len() < SMALL_ATTRIBUTE_SET { SMALL_SET_THRESHOLD } else { LARGE_SET_THRESHOLD };

    let Some((table_name, result)) = best else {
        return Ok(new_table_result(incoming));
    };

    Ok(decide(table_name, result, threshold, incoming))
}

fn decide(table_name: String, result: MatchResult, threshold: f64, incoming: &[Attribute]) -> EvolutionResult {
    let MatchResult { mapping, new_fields, score } = result;

    if score >= threshold && new_fields.is_empty() {
        return EvolutionResult { decision: Decision::SameTable { table: table_name }, mapping };
    }
    if score >= EVOLVED_TABLE_MIN_SCORE && !new_fields.is_empty() && new_fields.len() <= EVOLVED_TABLE_MAX_NEW_FIELDS {
        return EvolutionResult { decision: Decision::EvolvedTable { table: table_name, new_fields }, mapping };
    }
    if score >= EVOLVED_TABLE_MIN_SCORE {
        return EvolutionResult { decision: Decision::EvolvedTableJsonb { table: table_name, new_fields }, mapping };
    }
    new_table_result(incoming)
}

fn new_table_result(incoming: &[Attribute]) -> EvolutionResult {
    let name = synthesize_table_name(incoming);
    EvolutionResult { decision: Decision::NewTable { name }, mapping: BTreeMap::new() }
}

/// Synthesize a table name from the first three normalized attributes,
/// prefixed `table_`, truncated to 50 characters.
#[must_use]
pub fn synthesize_table_name(incoming: &[Attribute]) -> String {
    let parts: Vec<&str> = incoming.iter().take(3).map(|a| a.normalized.as_str()).collect();
    let mut name = format!("table_{}", parts.join("_"));
    name.truncate(SYNTHESIZED_NAME_MAX_LEN);
    name.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingest_core::model::{ColumnDescriptor, TableDescriptor};

    fn products_table() -> TableDescriptor {
        TableDescriptor {
            name: "products".into(),
            columns: vec![
                ColumnDescriptor { name: "id".into(), pg_type: "integer".into(), nullable: false, is_primary: true },
                ColumnDescriptor { name: "name".into(), pg_type: "varchar(100)".into(), nullable: true, is_primary: false },
                ColumnDescriptor { name: "price".into(), pg_type: "real".into(), nullable: true, is_primary: false },
            ],
        }
    }

    #[tokio::test]
    async fn exact_match_with_no_new_fields_is_same_table() {
        let catalog = SharedCatalog::new();
        catalog.refresh(products_table()).await;

        let incoming = vec![Attribute::new("id"), Attribute::new("name"), Attribute::new("price")];
        let result = evaluate(&catalog, &incoming).await.unwrap();
        assert_eq!(result.decision, Decision::SameTable { table: "products".into() });
    }

    #[tokio::test]
    async fn few_new_fields_evolve_the_table() {
        let catalog = SharedCatalog::new();
        catalog.refresh(products_table()).await;

        let incoming =
        vec![Attribute::new("id"), Attribute::new("name"), Attribute::new("price"), Attribute::new("warranty_months")];
        let result = evaluate(&catalog, &incoming).await.unwrap();
        assert_eq!(
            result.decision,
            Decision::EvolvedTable { table: "products".into(), new_fields: vec!["warranty_months".into()] }
        );
    }

    #[tokio::test]
    async fn empty_catalog_produces_new_table() {
        let catalog = SharedCatalog::new();
        let incoming = vec![Attribute::new("email"), Attribute::new("phone"), Attribute::new("address")];
        let result = evaluate(&catalog, &incoming).await.unwrap();
        assert!(matches!(result.decision, Decision::NewTable {.. }));
    }

    #[tokio::test]
    async fn empty_attribute_list_is_an_error() {
        let catalog = SharedCatalog::new();
        let err = evaluate(&catalog, &[]).await.unwrap_err();
        assert!(matches!(err, MatchError::Empty));
    }

    #[test]
    fn table_name_synthesis_truncates_and_prefixes() {
        let incoming = vec![Attribute::new("email"), Attribute::new("phone"), Attribute::new("address")];
        let name = synthesize_table_name(&incoming);
        assert_eq!(name, "table_email_phone_address");
        assert!(name.len() <= 50);
    }
}
