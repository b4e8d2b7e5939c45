//! Engine configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use ouro_nullables::NullStore;
use ouro_store::{CommitBatch, StateStore, StoreError, Versioned};
use ouro_store_lmdb::{LmdbEnvironment, LmdbStateStore};
use ouro_types::Address;
use ouro_utils::LogFormat;

use crate::EscrowError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Volatile in-memory store.
    Memory,
    /// Durable LMDB environment under `data_dir`.
    Lmdb,
}

/// Configuration for an escrow engine host.
///
/// Can be loaded from a TOML file via [`EngineConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_storage")]
    pub storage: StorageBackend,

    /// Directory of the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Maximum LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_storage() -> StorageBackend {
    StorageBackend::Memory
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./ouro_data")
}

fn default_map_size() -> usize {
    1 << 30
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Maximum named databases per LMDB environment.
const LMDB_MAX_DBS: u32 = 4;

// ── Impl ───────────────────────────────────────────────────────────────

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, EscrowError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| EscrowError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, EscrowError> {
        toml::from_str(s).map_err(|e| EscrowError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, EscrowError> {
        toml::to_string_pretty(self).map_err(|e| EscrowError::Config(e.to_string()))
    }

    /// Install the global tracing subscriber described by this config.
    pub fn init_logging(&self) -> bool {
        ouro_utils::init_logging(self.log_format, &self.log_level)
    }

    /// Open the configured state store.
    pub fn open_store(&self) -> Result<AnyStore, EscrowError> {
        match self.storage {
            StorageBackend::Memory => Ok(AnyStore::Memory(NullStore::new())),
            StorageBackend::Lmdb => {
                let env = LmdbEnvironment::open(&self.data_dir, LMDB_MAX_DBS, self.map_size)
                    .map_err(|e| EscrowError::Storage(e.to_string()))?;
                Ok(AnyStore::Lmdb(env.state_store()))
            }
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            data_dir: default_data_dir(),
            map_size: default_map_size(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

/// A state store chosen at runtime from [`EngineConfig::storage`].
pub enum AnyStore {
    Memory(NullStore),
    Lmdb(LmdbStateStore),
}

impl StateStore for AnyStore {
    fn get(&self, key: &Address) -> Result<Option<Versioned>, StoreError> {
        match self {
            AnyStore::Memory(store) => store.get(key),
            AnyStore::Lmdb(store) => store.get(key),
        }
    }

    fn commit(&self, batch: CommitBatch) -> Result<(), StoreError> {
        match self {
            AnyStore::Memory(store) => store.commit(batch),
            AnyStore::Lmdb(store) => store.commit(batch),
        }
    }

    fn len(&self) -> Result<u64, StoreError> {
        match self {
            AnyStore::Memory(store) => store.len(),
            AnyStore::Lmdb(store) => store.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = EngineConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = EngineConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.storage, config.storage);
        assert_eq!(parsed.map_size, config.map_size);
        assert_eq!(parsed.data_dir, config.data_dir);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            storage = "lmdb"
            log_format = "json"
            map_size = 1048576
        "#;
        let config = EngineConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.storage, StorageBackend::Lmdb);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.map_size, 1_048_576);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn unknown_backend_is_a_config_error() {
        let err = EngineConfig::from_toml_str("storage = \"rocks\"").unwrap_err();
        assert!(matches!(err, EscrowError::Config(_)));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = EngineConfig::from_toml_file("/nonexistent/ouro.toml");
        assert!(matches!(result, Err(EscrowError::Config(_))));
    }

    #[test]
    fn lmdb_backend_opens_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            storage: StorageBackend::Lmdb,
            data_dir: dir.path().join("state"),
            map_size: 10 * 1024 * 1024,
            ..EngineConfig::default()
        };
        let store = config.open_store().unwrap();
        assert!(matches!(store, AnyStore::Lmdb(_)));
        assert!(store.is_empty().unwrap());
    }
}
