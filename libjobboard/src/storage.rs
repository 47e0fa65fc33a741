//! Durable session storage
//!
//! The bearer token survives restarts in a small key/value store. Three
//! backends implement [`TokenStorage`]:
//!
//! - [`FileStorage`]: a JSON object on disk, mode 600 on Unix (default)
//! - [`KeyringStorage`]: the OS keyring
//! - [`MemoryStorage`]: process-local, for tests and `--no-persist` style use
//!
//! Keys are plain strings. The job board uses `token`, the catalog uses
//! `my_token`, so both sessions can share one backend.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::config::StorageConfig;
use crate::error::StorageError;

type StorageResult<T> = std::result::Result<T, StorageError>;

/// Key/value store for session tokens
pub trait TokenStorage: Send + Sync {
    /// Value stored under `key`, `None` if absent
    fn load(&self, key: &str) -> StorageResult<Option<String>>;

    fn save(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`; removing an absent key is not an error
    fn remove(&self, key: &str) -> StorageResult<()>;

    fn backend_name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "keyring" => Ok(StorageBackend::Keyring),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(format!(
                "Invalid storage backend '{}'. Valid options: file, keyring, memory",
                s
            )),
        }
    }
}

/// Open the backend named in the configuration
pub fn open_storage(config: &StorageConfig) -> StorageResult<Arc<dyn TokenStorage>> {
    let storage: Arc<dyn TokenStorage> = match config.backend {
        StorageBackend::File => Arc::new(FileStorage::new(config.expand_path())),
        StorageBackend::Keyring => Arc::new(KeyringStorage::new()?),
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
    };
    tracing::debug!("Using {} session storage", storage.backend_name());
    Ok(storage)
}

// ============================================================================
// Memory
// ============================================================================

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryStorage {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

// ============================================================================
// File
// ============================================================================

/// JSON object file, e.g. `{"token": "..."}`
///
/// Every call re-reads the file, so two processes sharing it see each
/// other's logins and logouts.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> StorageResult<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&content)
            .map_err(|e| StorageError::Corrupt(format!("{}: {}", self.path.display(), e)))
    }

    /// Current map for a write, and whether a corrupt file is being replaced
    fn read_for_write(&self) -> StorageResult<(HashMap<String, String>, bool)> {
        match self.read_all() {
            Ok(values) => Ok((values, false)),
            Err(StorageError::Corrupt(reason)) => {
                tracing::warn!("Replacing corrupt session file: {}", reason);
                Ok((HashMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn write_all(&self, values: &HashMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(values)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        std::fs::write(&self.path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }
}

impl TokenStorage for FileStorage {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        let (mut values, _) = self.read_for_write()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)?;
        tracing::debug!("Saved '{}' to {}", key, self.path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let (mut values, replaced) = self.read_for_write()?;
        if values.remove(key).is_some() || replaced {
            self.write_all(&values)?;
            tracing::debug!("Removed '{}' from {}", key, self.path.display());
        }
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "file"
    }
}

// ============================================================================
// Keyring
// ============================================================================

const KEYRING_SERVICE: &str = "jobboard";

/// OS keyring, one entry per key under the `jobboard` service
#[derive(Debug, Clone)]
pub struct KeyringStorage {
    service: String,
}

impl KeyringStorage {
    /// # Errors
    ///
    /// Returns `StorageError::KeyringUnavailable` when no keyring is reachable
    /// (headless Linux without Secret Service, for instance).
    pub fn new() -> StorageResult<Self> {
        keyring::Entry::new(KEYRING_SERVICE, "availability_check")
            .map_err(|e| StorageError::KeyringUnavailable(e.to_string()))?;
        Ok(Self {
            service: KEYRING_SERVICE.to_string(),
        })
    }

    fn entry(&self, key: &str) -> StorageResult<keyring::Entry> {
        keyring::Entry::new(&self.service, key)
            .map_err(|e| StorageError::KeyringUnavailable(e.to_string()))
    }
}

impl TokenStorage for KeyringStorage {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StorageError::Keyring(e.to_string())),
        }
    }

    fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| StorageError::Keyring(e.to_string()))?;
        tracing::debug!("Saved '{}' to OS keyring", key);
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        match self.entry(key)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StorageError::Keyring(e.to_string())),
        }
    }

    fn backend_name(&self) -> &str {
        "keyring"
    }
}
