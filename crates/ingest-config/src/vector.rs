//! Vector index configuration (`CHROMA_PERSIST_PATH`, `CHROMA_NOSQL_COLLECTION`).

use serde::{Deserialize, Serialize};

fn default_collection() -> String {
    "ingestion".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VectorConfig {
    #[serde(default)]
    pub persist_path: String,
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            persist_path: String::new(),
            collection: default_collection(),
        }
    }
}

impl VectorConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.persist_path.is_empty()
    }

    pub(crate) fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("CHROMA_PERSIST_PATH") {
            self.persist_path = v;
        }
        if let Ok(v) = std::env::var("CHROMA_NOSQL_COLLECTION") {
            self.collection = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_collection_name() {
        assert_eq!(VectorConfig::default().collection, "ingestion");
        assert!(!VectorConfig::default().is_configured());
    }
}
