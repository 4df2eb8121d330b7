//! Collection-hint inference: a fixed keyword taxonomy consulted when no
//! explicit hint is supplied by the caller.

/// `(collection name, keywords)`, checked in order — the first entry with a
/// case-insensitive substring hit wins. `general` has no keywords and is
/// the default when nothing else matches.
const TAXONOMY: &[(&str, &[&str])] = &[
    ("products", &["product", "item", "sku", "catalog", "inventory", "price"]),
    ("users", &["user", "account", "profile", "member", "customer"]),
    ("orders", &["order", "purchase", "transaction", "invoice", "checkout"]),
    ("documents", &["document", "report", "memo", "contract", "article"]),
    ("media", &["image", "video", "audio", "photo", "clip", "recording"]),
];

const DEFAULT_COLLECTION: &str = "general";

/// Infer a collection hint from the concatenation of a file's original
/// name, its declared attributes (if any), and a slice of its extracted
/// text (callers pass the first ~200 characters, per the taxonomy's
/// matching rule).
#[must_use]
pub fn infer_collection(original_name: &str, attributes: &[String], text_sample: &str) -> String {
    let mut haystack = String::with_capacity(original_name.len() + text_sample.len() + 32);
    haystack.push_str(original_name);
    haystack.push(' ');
    for attr in attributes {
        haystack.push_str(attr);
        haystack.push(' ');
    }
    haystack.push_str(text_sample);
    let haystack = haystack.to_ascii_lowercase();

    for (collection, keywords) in TAXONOMY {
        if keywords.iter().any(|kw| haystack.contains(kw)) {
            return (*collection).to_string();
        }
    }
    DEFAULT_COLLECTION.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_on_filename() {
        assert_eq!(infer_collection("product_catalog.csv", &[], ""), "products");
    }

    #[test]
    fn matches_on_attribute_name() {
        assert_eq!(infer_collection("data.json", &["customer_email".to_string()], ""), "users");
    }

    #[test]
    fn matches_on_text_sample() {
        assert_eq!(infer_collection("notes.txt", &[], "this invoice covers Q3 purchases"), "orders");
    }

    #[test]
    fn falls_back_to_general_when_nothing_matches() {
        assert_eq!(infer_collection("misc.txt", &[], "nothing taxonomy related here"), "general");
    }

    #[test]
    fn first_taxonomy_entry_wins_on_multiple_matches() {
        // "product" (products) and "report" (documents) both appear; products comes first.
        assert_eq!(infer_collection("product_report.txt", &[], ""), "products");
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(infer_collection("USER_PROFILE.csv", &[], ""), "users");
    }
}
