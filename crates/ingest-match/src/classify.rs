//! StructureClassifier.
//!
//! Scores a parsed payload's evidence on two axes and classifies it as
//! routable through the relational path (`Sql`) or the document/vector path
//! (`NoSql`). Decoupled from any particular parser: callers (the
//! orchestrator) observe the payload and populate [`ClassifierSignals`]
//! rather than this module re-deriving them from raw bytes.

/// Evidence observed about one file's parsed payload. Every field defaults to "signal absent".
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifierSignals {
    pub tabular_container: bool,
    pub json_array_uniform_keys: bool,
    pub json_array_divergent_keys: bool,
    pub nested_depth_ge_1: bool,
    pub has_id_like_attribute: bool,
    pub long_string_field: bool,
    pub html_table_with_th: bool,
    pub plain_text_no_delimiter: bool,
    pub xml_uniform_siblings: bool,
}

/// A single scored signal, retained for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredSignal {
    pub name: &'static str,
    pub delta_sql: i32,
    pub delta_nosql: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureKind {
    Sql,
    NoSql,
}

#[derive(Debug, Clone)]
pub struct Classification {
    pub kind: StructureKind,
    pub sql_score: i32,
    pub nosql_score: i32,
    pub confidence: f64,
    pub signals: Vec<ScoredSignal>,
}

/// Scoring table from, as `(name, predicate, delta_sql, delta_nosql)`.
const TABLE: &[(&str, fn(&ClassifierSignals) -> bool, i32, i32)] = &[
    ("tabular_container", |s| s.tabular_container, 5, 0),
    ("json_array_uniform_keys", |s| s.json_array_uniform_keys, 4, 0),
    ("json_array_divergent_keys", |s| s.json_array_divergent_keys, 0, 3),
    ("nested_depth_ge_1", |s| s.nested_depth_ge_1, 0, 4),
    ("has_id_like_attribute", |s| s.has_id_like_attribute, 1, 0),
    ("long_string_field", |s| s.long_string_field, 0, 2),
    ("html_table_with_th", |s| s.html_table_with_th, 3, 0),
    ("plain_text_no_delimiter", |s| s.plain_text_no_delimiter, 0, 5),
    ("xml_uniform_siblings", |s| s.xml_uniform_siblings, 3, 0),
];

/// Classify a payload from its observed signals.
#[must_use]
pub fn classify(signals: &ClassifierSignals) -> Classification {
    let mut sql_score = 0;
    let mut nosql_score = 0;
    let mut contributing = Vec::new();

    for &(name, predicate, delta_sql, delta_nosql) in TABLE {
        if predicate(signals) {
            sql_score += delta_sql;
            nosql_score += delta_nosql;
            contributing.push(ScoredSignal { name, delta_sql, delta_nosql });
        }
    }

    let kind = if sql_score >= nosql_score { StructureKind::Sql } else { StructureKind::NoSql };
    let max_score = sql_score.max(nosql_score).max(1);
    let confidence = (sql_score - nosql_score).unsigned_abs() as f64 / max_score as f64;

    Classification { kind, sql_score, nosql_score, confidence, signals: contributing }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabular_container_classifies_sql() {
        let signals = ClassifierSignals { tabular_container: true,..Default::default() };
        let result = classify(&signals);
        assert_eq!(result.kind, StructureKind::Sql);
        assert_eq!(result.sql_score, 5);
    }

    #[test]
    fn nested_and_divergent_keys_classify_nosql() {
        let signals = ClassifierSignals {
            json_array_divergent_keys: true,
            nested_depth_ge_1: true,
            ..Default::default()
        };
        let result = classify(&signals);
        assert_eq!(result.kind, StructureKind::NoSql);
        assert_eq!(result.nosql_score, 7);
    }

    #[test]
    fn tie_favors_sql() {
        let signals = ClassifierSignals::default();
        let result = classify(&signals);
        assert_eq!(result.kind, StructureKind::Sql);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn confidence_reflects_score_gap() {
        let signals = ClassifierSignals { tabular_container: true, has_id_like_attribute: true,..Default::default() };
        let result = classify(&signals);
        assert_eq!(result.sql_score, 6);
        assert_eq!(result.nosql_score, 0);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn all_contributing_signals_are_retained() {
        let signals = ClassifierSignals { tabular_container: true, has_id_like_attribute: true,..Default::default() };
        let result = classify(&signals);
        assert_eq!(result.signals.len(), 2);
    }
}
