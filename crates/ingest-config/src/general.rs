//! General pipeline tuning knobs not tied to a specific env var, used
//! throughout the component design.

use serde::{Deserialize, Serialize};

const fn default_chunk_size() -> usize {
    1000
}

const fn default_chunk_overlap() -> usize {
    200
}

const fn default_insert_batch_size() -> usize {
    100
}

const fn default_type_sample_size() -> usize {
    100
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Character window size for document chunking.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Character overlap between consecutive chunks.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Row batch size for multi-values INSERT statements.
    #[serde(default = "default_insert_batch_size")]
    pub insert_batch_size: usize,

    /// Number of non-null values sampled per column for type inference.
    #[serde(default = "default_type_sample_size")]
    pub type_sample_size: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            insert_batch_size: default_insert_batch_size(),
            type_sample_size: default_type_sample_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = GeneralConfig::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.insert_batch_size, 100);
        assert_eq!(config.type_sample_size, 100);
    }
}
