//! Document store connection configuration (`MONGO_URI`, `MONGO_DB`).
//!
//! Absence disables document persistence; the orchestrator still returns
//! `completed` with placeholder ids.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DocumentConfig {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub database: String,
}

impl DocumentConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.uri.is_empty() && !self.database.is_empty()
    }

    pub(crate) fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("MONGO_URI") {
            self.uri = v;
        }
        if let Ok(v) = std::env::var("MONGO_DB") {
            self.database = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unconfigured() {
        assert!(!DocumentConfig::default().is_configured());
    }
}
