//! Dotenv discovery and config loading ahead of building an orchestrator.

use std::path::Path;

use anyhow::Context;
use ingest_config::IngestConfig;

/// Load a project-level `.env` (if present) and `ingest.toml`, then
/// assemble the layered [`IngestConfig`].
///
/// # Errors
///
/// Returns an error if `ingest.toml` exists but fails to parse.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<IngestConfig> {
    dotenvy::dotenv().ok();

    let path = config_path.map_or_else(|| Path::new("ingest.toml").to_path_buf(), std::path::PathBuf::from);
    IngestConfig::load_from(&path).context("failed to load ingestion configuration")
}
