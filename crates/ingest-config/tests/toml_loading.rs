//! Integration tests for `ingest.toml` + environment configuration loading.
//!
//! Uses `figment::Jail` for safe, sandboxed env var manipulation.

use figment::Jail;
use ingest_config::IngestConfig;

#[test]
fn loads_relational_config_from_toml() {
    Jail::expect_with(|jail| {
            jail.create_file(
                "ingest.toml",
                r#"
                [relational]
                host = "db.internal"
                port = 5433
                db_name = "catalog"
                user = "ingest"
                password = "secret"
                "#,
            )?;

            let config = IngestConfig::load().expect("config loads");
            assert_eq!(config.relational.host, "db.internal");
            assert_eq!(config.relational.port, 5433);
            assert_eq!(config.relational.db_name, "catalog");
            assert!(config.relational.is_configured());
            Ok(())
    });
}

#[test]
fn loads_vector_config_from_toml() {
    Jail::expect_with(|jail| {
            jail.create_file(
                "ingest.toml",
                r#"
                [vector]
                persist_path = "/var/lib/ingest/vectors"
                collection = "catalog_vectors"
                "#,
            )?;

            let config = IngestConfig::load().expect("config loads");
            assert_eq!(config.vector.persist_path, "/var/lib/ingest/vectors");
            assert_eq!(config.vector.collection, "catalog_vectors");
            assert!(config.vector.is_configured());
            Ok(())
    });
}

#[test]
fn defaults_apply_when_no_toml_present() {
    Jail::expect_with(|_jail| {
            let config = IngestConfig::load().expect("config loads");
            assert_eq!(config.object_store.root, "../storage");
            assert_eq!(config.tenant.default_tenant_id, "default");
            Ok(())
    });
}

#[test]
fn env_vars_override_toml_per_spec_table() {
    Jail::expect_with(|jail| {
            jail.set_env("DB_HOST", "env-host");
            jail.set_env("DB_PORT", "7777");

            jail.create_file(
                "ingest.toml",
                r#"
                [relational]
                host = "toml-host"
                port = 5433
                db_name = "catalog"
                "#,
            )?;

            let config = IngestConfig::load().expect("config loads");
            assert_eq!(config.relational.host, "env-host");
            assert_eq!(config.relational.port, 7777);
            // Fields not overridden by env retain their TOML value.
            assert_eq!(config.relational.db_name, "catalog");
            Ok(())
    });
}

#[test]
fn env_only_configuration_with_no_toml() {
    Jail::expect_with(|jail| {
            jail.set_env("MONGO_URI", "mongodb://localhost:27017");
            jail.set_env("MONGO_DB", "catalog");
            jail.set_env("CHROMA_PERSIST_PATH", "/tmp/chroma");
            jail.set_env("LOCAL_ROOT_REPO", "/data/storage");
            jail.set_env("DEFAULT_TENANT_ID", "acme");
            jail.set_env("ENABLE_LOCAL_PATH_GENERATOR", "true");
            jail.set_env("LOCAL_PATH_GENERATOR_MOVE_FILES", "false");

            let config = IngestConfig::load().expect("config loads");
            assert!(config.document.is_configured());
            assert_eq!(config.document.uri, "mongodb://localhost:27017");
            assert_eq!(config.vector.persist_path, "/tmp/chroma");
            assert_eq!(config.object_store.root, "/data/storage");
            assert_eq!(config.tenant.default_tenant_id, "acme");
            assert!(config.path_planner.enabled);
            assert!(!config.path_planner.move_files);
            Ok(())
    });
}
