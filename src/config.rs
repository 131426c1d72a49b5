//! Configuration management with YAML support

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub contacts: ContactsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

/// Address book configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactsConfig {
    /// When false the address book is treated as inaccessible
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// JSON export to read contacts from
    #[serde(default)]
    pub path: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_database_path() -> String {
    "~/.local/share/recall/recall.db".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    /// Searches in order:
    /// 1. Provided path
    /// 2. ./recall.yaml (current directory)
    /// 3. ~/.config/recall/recall.yaml
    pub fn load(path: &str) -> Result<Self> {
        let search_paths = vec![
            shellexpand::tilde(path).to_string(),
            "recall.yaml".to_string(),
            shellexpand::tilde("~/.config/recall/recall.yaml").to_string(),
        ];

        for search_path in &search_paths {
            if std::path::Path::new(search_path).exists() {
                let content = std::fs::read_to_string(search_path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        // No config file found, use defaults
        Ok(Config::default())
    }

    /// Like [`Config::load`], but falls back to defaults on error and hands
    /// the error back so the caller can report it once logging is up.
    pub fn load_or_default(path: &str) -> (Self, Option<anyhow::Error>) {
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e)),
        }
    }

    /// Get the database path, expanding ~ to home directory
    pub fn database_path(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.database.path).to_string();
        PathBuf::from(expanded)
    }

    /// Get the contacts export path, if configured
    pub fn contacts_path(&self) -> Option<PathBuf> {
        self.contacts
            .path
            .as_ref()
            .map(|p| PathBuf::from(shellexpand::tilde(p).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.contacts.enabled);
        assert!(config.contacts_path().is_none());
        assert_eq!(config.logging.level, "warn");
        assert!(config.database_path().ends_with("recall/recall.db"));
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
database:
  path: /tmp/recall-test.db

contacts:
  path: /tmp/contacts.json

logging:
  level: recall=debug
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/recall-test.db"));
        assert_eq!(config.contacts_path(), Some(PathBuf::from("/tmp/contacts.json")));
        assert!(config.contacts.enabled);
        assert_eq!(config.logging.level, "recall=debug");
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yaml");
        std::fs::write(&path, "contacts:\n  enabled: false\n").unwrap();

        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert!(!config.contacts.enabled);
        assert_eq!(config.database.path, default_database_path());
    }

    #[test]
    fn test_malformed_config_falls_back_with_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "database:\n  path: [unclosed\n").unwrap();

        assert!(Config::load(path.to_str().unwrap()).is_err());

        let (config, error) = Config::load_or_default(path.to_str().unwrap());
        assert!(error.is_some());
        assert_eq!(config.database.path, default_database_path());
    }
}
