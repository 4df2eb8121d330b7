//! Relational store connection configuration (`DB_HOST`, `DB_PORT`,...).

use serde::{Deserialize, Serialize};

const fn default_port() -> u16 {
    5432
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelationalConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub db_name: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
}

impl Default for RelationalConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            db_name: String::new(),
            user: String::new(),
            password: String::new(),
        }
    }
}

impl RelationalConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.host.is_empty() && !self.db_name.is_empty()
    }

    pub(crate) fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("DB_HOST") {
            self.host = v;
        }
        if let Ok(v) = std::env::var("DB_PORT")
        && let Ok(port) = v.parse()
        {
            self.port = port;
        }
        if let Ok(v) = std::env::var("DB_NAME") {
            self.db_name = v;
        }
        if let Ok(v) = std::env::var("DB_USER") {
            self.user = v;
        }
        if let Ok(v) = std::env::var("DB_PASSWORD") {
            self.password = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = RelationalConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.port, 5432);
    }

    #[test]
    fn configured_when_host_and_db_set() {
        let config = RelationalConfig {
            host: "localhost".into(),
            db_name: "ingest".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
    }
}
