//! Relational store connection handling.
//!
//! `RelationalConfig` is host/port/db_name/user/password shaped, matching
//! the source system's own connection contract. The store backing it here
//! is libSQL rather than a Postgres wire-protocol client, so that contract
//! is bridged rather than matched literally: an empty or loopback `host`
//! opens an embedded file named after `db_name`; any other `host` is taken
//! as a libSQL/Turso endpoint built from `host:port`, with `password`
//! reused as the endpoint's bearer auth token and `user` left unused (the
//! Hrana protocol libSQL speaks has no username concept).

use ingest_config::RelationalConfig;
use libsql::{Builder, Connection, Database};

use crate::error::SqlError;

const LOOPBACK_HOSTS: &[&str] = &["", "localhost", "127.0.0.1"];

/// An open connection to the relational store, plus the capability probes
/// the executor needs before it picks a primary-key synthesis strategy.
pub struct SqlStore {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    supports_returning: bool,
}

impl SqlStore {
    /// Open a store from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::NotConfigured`] if `config` has no host/db_name,
    /// or [`SqlError::Connect`] if the underlying libSQL connection fails.
    pub async fn connect(config: &RelationalConfig) -> Result<Self, SqlError> {
        if !config.is_configured() {
            return Err(SqlError::NotConfigured);
        }

        let db = if LOOPBACK_HOSTS.contains(&config.host.as_str()) {
            Builder::new_local(format!("{}.db", config.db_name)).build().await.map_err(SqlError::Connect)?
        } else {
            let url = format!("libsql://{}:{}", config.host, config.port);
            Builder::new_remote(url, config.password.clone()).build().await.map_err(SqlError::Connect)?
        };

        let conn = db.connect().map_err(SqlError::Connect)?;
        let supports_returning = probe_returning_support(&conn).await;
        Ok(Self { db, conn, supports_returning })
    }

    /// Open an in-memory store, for tests.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::Connect`] if libSQL fails to initialize an
    /// in-memory database (infrastructure-level, not expected in practice).
    pub async fn connect_in_memory() -> Result<Self, SqlError> {
        let db = Builder::new_local(":memory:").build().await.map_err(SqlError::Connect)?;
        let conn = db.connect().map_err(SqlError::Connect)?;
        let supports_returning = probe_returning_support(&conn).await;
        Ok(Self { db, conn, supports_returning })
    }

    #[must_use]
    pub const fn supports_returning(&self) -> bool {
        self.supports_returning
    }

    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Execute a statement with no parameters, returning rows affected.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::Ddl`] if execution fails.
    pub async fn execute_ddl(&self, sql: &str) -> Result<(), SqlError> {
        self.conn.execute(sql, ()).await.map_err(SqlError::Ddl)?;
        Ok(())
    }

    /// Open a fresh transaction. Insert batches run inside one so a
    /// failing batch does not leave a half-written table: callers commit
    /// on success and let the transaction drop (implicit rollback) on
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::Insert`] if the transaction cannot be opened.
    pub async fn begin(&self) -> Result<libsql::Transaction, SqlError> {
        self.conn.transaction().await.map_err(SqlError::Insert)
    }
}

/// Probe whether the connected engine supports `RETURNING`, by attempting
/// a trivial statement that uses it.
async fn probe_returning_support(conn: &Connection) -> bool {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS __ingest_returning_probe (id INTEGER PRIMARY KEY)",
        (),
    )
    .await
    .is_ok()
        && conn
            .query("INSERT INTO __ingest_returning_probe (id) VALUES (0) ON CONFLICT DO NOTHING RETURNING id", ())
            .await
            .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_store_supports_returning() {
        let store = SqlStore::connect_in_memory().await.unwrap();
        assert!(store.supports_returning());
    }

    #[tokio::test]
    async fn unconfigured_relational_config_is_rejected() {
        let config = RelationalConfig::default();
        let err = SqlStore::connect(&config).await.unwrap_err();
        assert!(matches!(err, SqlError::NotConfigured));
    }
}
