//! Column type inference from a sample of a column's non-null values.

use ingest_core::model::Scalar;
use regex::Regex;
use std::sync::LazyLock;

/// Datetime-looking strings: a date, optionally followed by a time
/// component.
static DATETIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}(T.*)?$").expect("static pattern is valid"));

const VARCHAR_ROUND_TO: usize = 50;
const VARCHAR_CAP: usize = 1000;

/// Infer the SQL column type for one column from a bounded sample of its
/// non-null values (the sample size is a caller concern — see
/// `GeneralConfig::type_sample_size`).
///
/// An empty sample (a column that was all-null in the observed rows)
/// infers as `text`, the most permissive type.
#[must_use]
pub fn infer_column_type(samples: &[&Scalar]) -> String {
    if samples.is_empty() {
        return "text".to_string();
    }

    if samples.iter().all(|s| matches!(s, Scalar::Bool(_))) {
        return "integer".to_string();
    }
    if samples.iter().all(|s| matches!(s, Scalar::Int(_))) {
        return "integer".to_string();
    }
    if samples.iter().all(|s| matches!(s, Scalar::Int(_) | Scalar::Real(_))) {
        return "real".to_string();
    }
    if samples.iter().all(|s| matches!(s, Scalar::Timestamp(_))) {
        return "timestamp".to_string();
    }

    let all_text = samples.iter().all(|s| matches!(s, Scalar::Text(_)));
    if all_text {
        let texts: Vec<&str> = samples
            .iter()
            .filter_map(|s| if let Scalar::Text(t) = s { Some(t.as_str()) } else { None })
            .collect();
        if texts.iter().all(|t| DATETIME_PATTERN.is_match(t)) {
            return "timestamp".to_string();
        }
        return varchar_type(&texts);
    }

    // Mixed primitive kinds with no common family: fall back to text, the
    // type every value can be represented as.
    "text".to_string()
}

fn varchar_type(texts: &[&str]) -> String {
    let max_len = texts.iter().map(|t| t.chars().count()).max().unwrap_or(0);
    if max_len > VARCHAR_CAP {
        return "text".to_string();
    }
    let rounded = max_len.div_ceil(VARCHAR_ROUND_TO).max(1) * VARCHAR_ROUND_TO;
    format!("varchar({rounded})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn all_int_infers_integer() {
        let samples = [Scalar::Int(1), Scalar::Int(2)];
        let refs: Vec<&Scalar> = samples.iter().collect();
        assert_eq!(infer_column_type(&refs), "integer");
    }

    #[test]
    fn int_and_real_infers_real() {
        let samples = [Scalar::Int(1), Scalar::Real(2.5)];
        let refs: Vec<&Scalar> = samples.iter().collect();
        assert_eq!(infer_column_type(&refs), "real");
    }

    #[test]
    fn mixed_kinds_infer_text() {
        let samples = [Scalar::Int(1), Scalar::Text("x".into())];
        let refs: Vec<&Scalar> = samples.iter().collect();
        assert_eq!(infer_column_type(&refs), "text");
    }

    #[test]
    fn short_strings_round_up_to_next_fifty() {
        let samples = [Scalar::Text("hello".into())];
        let refs: Vec<&Scalar> = samples.iter().collect();
        assert_eq!(infer_column_type(&refs), "varchar(50)");
    }

    #[test]
    fn long_string_caps_at_text() {
        let long = "x".repeat(1200);
        let samples = [Scalar::Text(long)];
        let refs: Vec<&Scalar> = samples.iter().collect();
        assert_eq!(infer_column_type(&refs), "text");
    }

    #[test]
    fn datetime_looking_strings_infer_timestamp() {
        let samples = [Scalar::Text("2026-02-09".into()), Scalar::Text("2026-02-10T14:30:00".into())];
        let refs: Vec<&Scalar> = samples.iter().collect();
        assert_eq!(infer_column_type(&refs), "timestamp");
    }

    #[test]
    fn empty_sample_infers_text() {
        assert_eq!(infer_column_type(&[]), "text");
    }

    #[test]
    fn timestamp_scalars_infer_timestamp() {
        let samples = [Scalar::Timestamp(Utc::now())];
        let refs: Vec<&Scalar> = samples.iter().collect();
        assert_eq!(infer_column_type(&refs), "timestamp");
    }
}
