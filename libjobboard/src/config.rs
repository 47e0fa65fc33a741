//! Configuration management for Jobboard
//!
//! Loaded from `$JOBBOARD_CONFIG` or `<config dir>/jobboard/config.toml`.
//! A missing file is not an error: the defaults point at a backend on
//! `http://localhost:3001` and keep the session in a JSON file under the
//! data directory.
//!
//! ```toml
//! [api]
//! base_url = "https://jobs.example.com"
//! timeout_secs = 30
//!
//! [storage]
//! backend = "file"        # file | keyring | memory
//! path = "~/.local/share/jobboard/session.json"
//! token_key = "token"
//!
//! [catalog]
//! base_url = "https://shop.example.com"
//! token_key = "my_token"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::storage::StorageBackend;

pub const CONFIG_ENV: &str = "JOBBOARD_CONFIG";
pub const BACKEND_URL_ENV: &str = "JOBBOARD_BACKEND_URL";

const DEFAULT_BASE_URL: &str = "http://localhost:3001";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    #[serde(default = "default_session_path")]
    pub path: String,

    #[serde(default = "default_token_key")]
    pub token_key: String,
}

impl StorageConfig {
    /// Session file path with `~` expanded
    pub fn expand_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.path).to_string())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            path: default_session_path(),
            token_key: default_token_key(),
        }
    }
}

/// Retail catalog backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub base_url: String,

    #[serde(default = "default_catalog_token_key")]
    pub token_key: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// `session.json` in the platform data directory
fn default_session_path() -> String {
    match resolve_data_path() {
        Ok(dir) => dir.join(SESSION_FILE).to_string_lossy().into_owned(),
        Err(_) => format!("~/.local/share/jobboard/{}", SESSION_FILE),
    }
}

fn default_token_key() -> String {
    "token".to_string()
}

fn default_catalog_token_key() -> String {
    "my_token".to_string()
}

impl Config {
    /// Load from the default location, falling back to defaults if the file
    /// does not exist, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        let mut config = if config_path.exists() {
            Self::load_from_path(&config_path)?
        } else {
            tracing::debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            Self::default_config()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
            catalog: None,
        }
    }

    /// `JOBBOARD_BACKEND_URL` replaces `api.base_url`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url.trim().to_string();
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("api.base_url".to_string()).into());
        }
        if self.storage.token_key.trim().is_empty() {
            return Err(ConfigError::MissingField("storage.token_key".to_string()).into());
        }
        if let Some(catalog) = &self.catalog {
            if catalog.base_url.trim().is_empty() {
                return Err(ConfigError::MissingField("catalog.base_url".to_string()).into());
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("jobboard").join("config.toml"))
}

/// Resolve the data directory path following XDG Base Directory spec
pub fn resolve_data_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| ConfigError::MissingField("data directory".to_string()))?;

    Ok(data_dir.join("jobboard"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JobBoardError;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[api]
base_url = "https://jobs.example.com"
timeout_secs = 5

[storage]
backend = "keyring"
path = "/tmp/session.json"
token_key = "jwt"

[catalog]
base_url = "https://shop.example.com"
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.api.base_url, "https://jobs.example.com");
        assert_eq!(config.api.timeout(), Duration::from_secs(5));
        assert_eq!(config.storage.backend, StorageBackend::Keyring);
        assert_eq!(config.storage.token_key, "jwt");

        let catalog = config.catalog.unwrap();
        assert_eq!(catalog.base_url, "https://shop.example.com");
        assert_eq!(catalog.token_key, "my_token");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nbase_url = \"http://api.local\"\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.storage, StorageConfig::default());
        assert!(config.catalog.is_none());
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[api\nbase_url = ").unwrap();

        let result = Config::load_from_path(&path);
        assert!(matches!(
            result,
            Err(JobBoardError::Config(ConfigError::ParseError(_)))
        ));
    }

    #[test]
    fn test_empty_base_url_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nbase_url = \"  \"\n").unwrap();

        match Config::load_from_path(&path) {
            Err(JobBoardError::Config(ConfigError::MissingField(field))) => {
                assert_eq!(field, "api.base_url")
            }
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_default_session_path_is_in_data_dir() {
        let storage = StorageConfig::default();
        let expanded = storage.expand_path();
        assert_eq!(expanded, resolve_data_path().unwrap().join("session.json"));
    }

    #[test]
    fn test_expand_path_tilde() {
        let storage = StorageConfig {
            path: "~/jobboard/session.json".to_string(),
            ..StorageConfig::default()
        };
        let expanded = storage.expand_path();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with("jobboard/session.json"));
    }

    #[test]
    #[serial]
    fn test_load_missing_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::env::set_var(CONFIG_ENV, temp_dir.path().join("absent.toml"));
        std::env::remove_var(BACKEND_URL_ENV);

        let config = Config::load().unwrap();
        assert_eq!(config, Config::default_config());

        std::env::remove_var(CONFIG_ENV);
    }

    #[test]
    #[serial]
    fn test_backend_url_env_override() {
        let temp_dir = TempDir::new().unwrap();
        std::env::set_var(CONFIG_ENV, temp_dir.path().join("absent.toml"));
        std::env::set_var(BACKEND_URL_ENV, "https://staging.example.com");

        let config = Config::load().unwrap();
        assert_eq!(config.api.base_url, "https://staging.example.com");

        std::env::remove_var(BACKEND_URL_ENV);
        std::env::remove_var(CONFIG_ENV);
    }

    #[test]
    #[serial]
    fn test_resolve_config_path_from_env() {
        std::env::set_var(CONFIG_ENV, "/etc/jobboard.toml");
        assert_eq!(resolve_config_path().unwrap(), PathBuf::from("/etc/jobboard.toml"));
        std::env::remove_var(CONFIG_ENV);
    }
}
