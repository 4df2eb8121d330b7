//! # ingest-config
//!
//! Layered configuration loading for the ingestion pipeline using figment.
//!
//! Configuration sources (in priority order):
//! 1. Exact-name environment variables (`DB_HOST`, `MONGO_URI`,
//! `CHROMA_PERSIST_PATH`,...) — applied last, so they win over
//! everything else.
//! 2. Project-level `ingest.toml`.
//! 3. Built-in defaults.
//!
//! These variable names are flat and unprefixed, shared with the systems
//! this pipeline talks to (`DB_HOST`, not a prefixed, double-underscore
//! nested form). Figment's `Env` provider maps prefixed, nested keys onto
//! nested structs; it cannot address that flat contract directly, so the
//! final environment layer is applied explicitly via each section's
//! `apply_env`, after the TOML/defaults layer has been merged through
//! figment in the usual way.

pub mod document;
pub mod error;
pub mod general;
pub mod object_store;
pub mod relational;
pub mod tenant;
pub mod vector;

use std::path::Path;

use figment::Figment;
use figment::providers::{Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

pub use document::DocumentConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use object_store::ObjectStoreConfig;
pub use relational::RelationalConfig;
pub use tenant::{PathPlannerConfig, TenantConfig};
pub use vector::VectorConfig;

/// The full, layered ingestion configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IngestConfig {
    #[serde(default)]
    pub relational: RelationalConfig,
    #[serde(default)]
    pub document: DocumentConfig,
    #[serde(default)]
    pub vector: VectorConfig,
    #[serde(default)]
    pub object_store: ObjectStoreConfig,
    #[serde(default)]
    pub tenant: TenantConfig,
    #[serde(default)]
    pub path_planner: PathPlannerConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl IngestConfig {
    /// Load configuration: defaults, merged with an optional `ingest.toml`
    /// in the current directory, then overridden by the exact-name
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if the TOML file exists but fails to
    /// parse, or if the merged document fails to extract into
    /// `IngestConfig`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("ingest.toml"))
    }

    /// Load configuration from a specific TOML path (used by tests and by
    /// callers that locate the project root themselves).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if the TOML file exists but fails to
    /// parse, or if the merged document fails to extract into
    /// `IngestConfig`.
    pub fn load_from(toml_path: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = Figment::from(Serialized::defaults(Self::default()))
        .merge(Toml::file(toml_path))
        .extract()?;
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        self.relational.apply_env();
        self.document.apply_env();
        self.vector.apply_env();
        self.object_store.apply_env();
        self.tenant.apply_env();
        self.path_planner.apply_env();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unconfigured_but_usable() {
        let config = IngestConfig::default();
        assert!(!config.relational.is_configured());
        assert!(!config.document.is_configured());
        assert_eq!(config.object_store.root, "../storage");
        assert_eq!(config.tenant.default_tenant_id, "default");
        assert_eq!(config.general.chunk_size, 1000);
    }
}
