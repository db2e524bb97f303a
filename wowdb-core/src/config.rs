//! Browser configuration.
//!
//! Supports TOML configuration files like:
//! ```toml
//! database = "/data/wowdb.sqlite"
//! log_file = "/tmp/wowdb.log"
//!
//! [loot]
//! sort = "quality"
//! limit = 50
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Result, WowDbError};
use crate::loot::LootSort;

pub const DEFAULT_DATABASE: &str = "./wowdb.sqlite";

/// Loot listing preferences.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LootConfig {
    pub sort: Option<String>,
    pub limit: Option<usize>,
}

impl LootConfig {
    pub fn sort_order(&self) -> Result<LootSort> {
        match &self.sort {
            Some(sort) => sort.parse(),
            None => Ok(LootSort::default()),
        }
    }
}

/// Complete browser configuration loaded from TOML.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct BrowserConfig {
    pub database: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub loot: LootConfig,
}

impl BrowserConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            WowDbError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config from {:?}: {}", path, e),
            ))
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| WowDbError::Config(format!("Failed to parse config TOML: {}", e)))?;
        config
            .loot
            .sort_order()
            .map_err(|e| WowDbError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Database path, with a command-line override taking precedence.
    pub fn database_path(&self, cli_override: Option<PathBuf>) -> PathBuf {
        cli_override
            .or_else(|| self.database.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
database = "/data/wowdb.sqlite"

[loot]
sort = "quality"
limit = 25
"#;

        let config = BrowserConfig::from_str(toml).unwrap();
        assert_eq!(config.database, Some(PathBuf::from("/data/wowdb.sqlite")));
        assert_eq!(config.loot.sort_order().unwrap(), LootSort::Quality);
        assert_eq!(config.loot.limit, Some(25));
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = BrowserConfig::from_str("").unwrap();
        assert_eq!(config.loot.sort_order().unwrap(), LootSort::Chance);
        assert_eq!(config.database_path(None), PathBuf::from(DEFAULT_DATABASE));
        assert_eq!(
            config.database_path(Some(PathBuf::from("other.sqlite"))),
            PathBuf::from("other.sqlite")
        );
    }

    #[test]
    fn test_invalid_sort_is_rejected() {
        let result = BrowserConfig::from_str("[loot]\nsort = \"random\"\n");
        assert!(matches!(result, Err(WowDbError::Config(_))));
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wowdb.toml");
        std::fs::write(&path, "log_file = \"/tmp/x.log\"\n").unwrap();

        let config = BrowserConfig::from_file(&path).unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/x.log")));
        assert!(BrowserConfig::from_file(&dir.path().join("missing.toml")).is_err());
    }
}
