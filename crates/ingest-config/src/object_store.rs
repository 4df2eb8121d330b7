//! Object store configuration (`LOCAL_ROOT_REPO`).

use serde::{Deserialize, Serialize};

fn default_root() -> String {
    "../storage".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObjectStoreConfig {
    #[serde(default = "default_root")]
    pub root: String,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self { root: default_root() }
    }
}

impl ObjectStoreConfig {
    pub(crate) fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("LOCAL_ROOT_REPO") {
            self.root = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_root_matches_spec() {
        assert_eq!(ObjectStoreConfig::default().root, "../storage");
    }
}
