//! Attribute name and type similarity scoring, shared by the
//! attribute matcher and the schema evolution engine's semantic
//! candidate-retrieval pass.

use ingest_core::attribute::{normalize, same_synonym_class, tokenize};

const TOKEN_OVERLAP_WEIGHT: f64 = 0.8;
const NAME_WEIGHT: f64 = 0.7;
const TYPE_WEIGHT: f64 = 0.3;

/// Similarity of two attribute names, in `[0.0, 1.0]`: the maximum of exact
/// normalized equality, synonym-class membership, weighted token-overlap
/// Jaccard, and a `SequenceMatcher`-style character ratio.
#[must_use]
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let (na, nb) = (normalize(a), normalize(b));
    if na == nb {
        return 1.0;
    }
    if same_synonym_class(&na, &nb) {
        return 0.95;
    }

    let jaccard = TOKEN_OVERLAP_WEIGHT * token_jaccard(&na, &nb);
    let ratio = sequence_ratio(&na, &nb);
    jaccard.max(ratio)
}

fn token_jaccard(a: &str, b: &str) -> f64 {
    let ta: std::collections::BTreeSet<String> = tokenize(a).into_iter().collect();
    let tb: std::collections::BTreeSet<String> = tokenize(b).into_iter().collect();
    if ta.is_empty() && tb.is_empty() {
        return 0.0;
    }
    let intersection = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    if union == 0 { 0.0 } else { intersection as f64 / union as f64 }
}

/// A `difflib.SequenceMatcher.ratio()`-style character similarity:
/// `2 * matches / (len(a) + len(b))`, where `matches` is the length of the
/// longest common subsequence.
fn sequence_ratio(a: &str, b: &str) -> f64 {
    let (a, b): (Vec<char>, Vec<char>) = (a.chars().collect(), b.chars().collect());
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let matches = longest_common_subsequence(&a, &b);
    (2.0 * matches as f64) / (a.len() + b.len()) as f64
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb { prev[j] + 1 } else { prev[j + 1].max(curr[j]) };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// The primitive-type families consulted by `type_compatibility`.
///
/// `static` (not `const`) so `std::ptr::eq` below reliably identifies which
/// family a type belongs to by address rather than by re-deriving an enum.
static NUMERIC_FAMILY: &[&str] = &["int", "bigint", "numeric", "real"];
static TEXT_FAMILY: &[&str] = &["varchar", "text", "char"];
static DATETIME_FAMILY: &[&str] = &["timestamp", "date"];

fn family_of(type_name: &str) -> Option<&'static [&'static str]> {
    let base = type_name.split('(').next().unwrap_or(type_name);
    if NUMERIC_FAMILY.contains(&base) {
        Some(NUMERIC_FAMILY)
    } else if TEXT_FAMILY.contains(&base) {
        Some(TEXT_FAMILY)
    } else if DATETIME_FAMILY.contains(&base) {
        Some(DATETIME_FAMILY)
    } else {
        None
    }
}

/// Type compatibility of an incoming attribute's (optional) inferred type
/// against an existing column's declared type.
#[must_use]
pub fn type_compatibility(incoming: Option<&str>, existing: &str) -> f64 {
    let Some(incoming) = incoming else {
        // No sampled value for the incoming attribute, but the existing
        // column's type is known: partial credit rather than the
        // no-information floor used when neither type is known at all.
        return 0.7;
    };
    if incoming == existing {
        return 1.0;
    }
    match (family_of(incoming), family_of(existing)) {
        (Some(fa), Some(fb)) if std::ptr::eq(fa, fb) => {
            if std::ptr::eq(fa, NUMERIC_FAMILY) || std::ptr::eq(fa, TEXT_FAMILY) {
                0.9
            } else {
                0.8
            }
        }
        (Some(_), Some(_)) => 0.7,
        _ => 0.3,
    }
}

/// Combined attribute-match score: `0.7 * name_similarity + 0.3 *
/// type_compatibility`.
#[must_use]
pub fn combined_score(name_a: &str, name_b: &str, type_a: Option<&str>, type_b: &str) -> f64 {
    NAME_WEIGHT * name_similarity(name_a, name_b) + TYPE_WEIGHT * type_compatibility(type_a, type_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_normalized_match_is_one() {
        assert_eq!(name_similarity("Product Name", "product_name"), 1.0);
    }

    #[test]
    fn synonym_class_match_is_point_nine_five() {
        assert_eq!(name_similarity("price", "cost"), 0.95);
    }

    #[test]
    fn unrelated_names_score_low() {
        assert!(name_similarity("price", "shipping_zone") < 0.5);
    }

    #[test]
    fn token_overlap_detects_partial_rename() {
        let sim = name_similarity("customer_email", "email");
        assert!(sim > 0.3, "expected partial credit, got {sim}");
    }

    #[test]
    fn type_compatibility_exact_is_one() {
        assert_eq!(type_compatibility(Some("int"), "int"), 1.0);
    }

    #[test]
    fn type_compatibility_numeric_family_is_point_nine() {
        assert_eq!(type_compatibility(Some("int"), "real"), 0.9);
    }

    #[test]
    fn type_compatibility_unrelated_is_floor() {
        assert_eq!(type_compatibility(Some("int"), "varchar(50)"), 0.3);
    }

    #[test]
    fn type_compatibility_no_sample_is_point_seven() {
        assert_eq!(type_compatibility(None, "int"), 0.7);
    }
}
