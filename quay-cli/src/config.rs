//! CLI configuration handling.

use serde::{Deserialize, Serialize};
use std::path::Path;

use quay_postgres::context::{DEFAULT_LOCAL_PASSWORD, DEFAULT_LOCAL_PORT};

use crate::error::CliResult;

/// Default config file name (lives in project root)
pub const CONFIG_FILE_NAME: &str = "quay.toml";

/// Quay CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration
    pub db: DbConfig,

    /// Network configuration
    pub network: NetworkConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `quay.toml` from `dir`, falling back to defaults if it is absent
    pub fn load_or_default(dir: &Path) -> CliResult<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> CliResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Port the local database listens on
    pub port: u16,

    /// Password of the local `postgres` role
    pub password: String,

    /// Remote database URL set with `quay db remote set`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_LOCAL_PORT,
            password: DEFAULT_LOCAL_PASSWORD.to_string(),
            remote_url: None,
        }
    }
}

/// Network configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Name resolver: `native` or `https`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_resolver: Option<String>,

    /// Regular expression matching hosts behind the managed pooler
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_host_pattern: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_missing() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.db.port, 54322);
        assert_eq!(config.db.password, "postgres");
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"
            [db]
            port = 6000

            [network]
            dns_resolver = "https"
            "#,
        )
        .unwrap();

        let config = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(config.db.port, 6000);
        assert_eq!(config.db.password, "postgres");
        assert_eq!(config.network.dns_resolver.as_deref(), Some("https"));
        assert_eq!(config.network.managed_host_pattern, None);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let mut config = Config::default();
        config.db.remote_url = Some("postgresql://postgres:pw@db.example.com:6543/postgres".into());
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[db\nport = ").unwrap();

        let err = Config::load_or_default(dir.path()).unwrap_err();
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
