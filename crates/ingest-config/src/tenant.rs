//! Tenant and path-planner toggle configuration.

use serde::{Deserialize, Serialize};

fn default_tenant() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TenantConfig {
    #[serde(default = "default_tenant")]
    pub default_tenant_id: String,
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            default_tenant_id: default_tenant(),
        }
    }
}

impl TenantConfig {
    pub(crate) fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("DEFAULT_TENANT_ID") {
            self.default_tenant_id = v;
        }
    }
}

/// Toggles for the built-in / external `PathPlanner` capability.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PathPlannerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub move_files: bool,
}

impl PathPlannerConfig {
    fn parse_bool(value: &str) -> bool {
        matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
    }

    pub(crate) fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("ENABLE_LOCAL_PATH_GENERATOR") {
            self.enabled = Self::parse_bool(&v);
        }
        if let Ok(v) = std::env::var("LOCAL_PATH_GENERATOR_MOVE_FILES") {
            self.move_files = Self::parse_bool(&v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tenant_is_default() {
        assert_eq!(TenantConfig::default().default_tenant_id, "default");
    }

    #[test]
    fn bool_parsing_accepts_common_truthy_forms() {
        assert!(PathPlannerConfig::parse_bool("true"));
        assert!(PathPlannerConfig::parse_bool("1"));
        assert!(PathPlannerConfig::parse_bool("YES"));
        assert!(!PathPlannerConfig::parse_bool("false"));
        assert!(!PathPlannerConfig::parse_bool(""));
    }
}
