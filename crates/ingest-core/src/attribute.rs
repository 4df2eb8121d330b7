//! Attribute normalization and the synonym class table.

/// Normalize an attribute name: lowercase, non-alphanumeric → `_`, collapse
/// repeated `_`, trim `_`.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
#[must_use]
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_underscore = false;
    for ch in name.chars() {
        let lower = ch.to_ascii_lowercase();
        if lower.is_ascii_alphanumeric() {
            out.push(lower);
            last_was_underscore = false;
        } else if !last_was_underscore {
            out.push('_');
            last_was_underscore = true;
        }
    }
    out.trim_matches('_').to_string()
}

/// Whether a normalized attribute name is an ID attribute.
#[must_use]
pub fn is_id_attribute(normalized: &str) -> bool {
    matches!(normalized, "id" | "pk" | "key" | "identifier")
        || normalized.starts_with("id_")
        || normalized.ends_with("_id")
}

/// The fixed, enumerated synonym classes consulted by the attribute matcher.
/// Loaded once as a static table so it can evolve without touching the
/// matching algorithm.
pub const SYNONYM_CLASSES: &[&[&str]] = &[
    &["name", "title", "label"],
    &["price", "cost", "amount", "value", "total"],
    &["stock", "quantity", "qty", "count", "inventory"],
    &["email", "email_address", "mail"],
    &["phone", "mobile", "telephone", "contact_number"],
    &["address", "location", "addr"],
    &["date", "created_at", "timestamp", "created_date"],
    &["category", "type", "kind", "classification"],
    &["status", "state", "condition"],
    &["description", "desc", "details", "notes"],
    &["id", "identifier", "key", "pk"],
];

/// Whether two normalized names fall in the same synonym class.
#[must_use]
pub fn same_synonym_class(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    SYNONYM_CLASSES
        .iter()
        .any(|class| class.contains(&a) && class.contains(&b))
}

/// Tokenize a normalized (underscore-joined) or camelCase name into lowercase
/// tokens for Jaccard overlap comparison.
#[must_use]
pub fn tokenize(name: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch == '_' {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        current.push(ch.to_ascii_lowercase());
        prev_lower = ch.is_lowercase();
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_idempotent() {
        let cases = ["Product Name!!", " leading", "trailing ", "snake_case_already", "id"];
        for case in cases {
            let once = normalize(case);
            let twice = normalize(&once);
            assert_eq!(once, twice, "not idempotent for {case:?}");
        }
    }

    #[test]
    fn normalize_collapses_and_trims() {
        assert_eq!(normalize("Product Name!!"), "product_name");
        assert_eq!(normalize("__weird___name__"), "weird_name");
        assert_eq!(normalize("CamelCase"), "camelcase");
    }

    #[test]
    fn id_attribute_detection() {
        assert!(is_id_attribute("id"));
        assert!(is_id_attribute("pk"));
        assert!(is_id_attribute("key"));
        assert!(is_id_attribute("identifier"));
        assert!(is_id_attribute("id_product"));
        assert!(is_id_attribute("product_id"));
        assert!(!is_id_attribute("identity_theft"));
        assert!(!is_id_attribute("name"));
    }

    #[test]
    fn synonym_class_membership() {
        assert!(same_synonym_class("price", "cost"));
        assert!(same_synonym_class("qty", "stock"));
        assert!(!same_synonym_class("price", "name"));
        assert!(same_synonym_class("name", "name"));
    }

    #[test]
    fn tokenize_camel_and_snake() {
        assert_eq!(tokenize("product_name"), vec!["product", "name"]);
        assert_eq!(tokenize("productName"), vec!["product", "name"]);
        assert_eq!(tokenize("id"), vec!["id"]);
    }
}
