use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::TrackerConfig;
use crate::snapshot::Snapshot;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub trait KeyValueStore: Send + Sync {
    fn is_available(&self) -> bool;
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn is_available(&self) -> bool {
        fs::create_dir_all(&self.dir).is_ok() && self.dir.is_dir()
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let target = self.path_for(key);
        let staging = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&staging, value)?;
        fs::rename(&staging, &target)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    available: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            available: false,
        }
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StoreError> {
        if !self.available {
            return Err(StoreError::Unavailable);
        }
        self.entries
            .lock()
            .map_err(|_| StoreError::Backend("memory store poisoned".to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn is_available(&self) -> bool {
        self.available
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedEnvelope {
    pub version: String,
    pub snapshot: Snapshot,
}

#[derive(Debug, Deserialize)]
struct VersionProbe {
    version: Option<String>,
}

pub struct SnapshotStore {
    backend: Box<dyn KeyValueStore>,
    key: String,
    version: String,
}

impl SnapshotStore {
    pub fn new(
        backend: Box<dyn KeyValueStore>,
        key: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            key: key.into(),
            version: version.into(),
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(
            Box::new(FileStore::new(config.storage_dir.clone())),
            config.storage_key.clone(),
            config.format_version.clone(),
        )
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Only an envelope that cannot be encoded is reported back.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let envelope = PersistedEnvelope {
            version: self.version.clone(),
            snapshot: snapshot.clone(),
        };
        let raw = serde_json::to_string(&envelope)?;

        if !self.backend.is_available() {
            warn!("snapshot storage not available");
            return Ok(());
        }

        match self.backend.set(&self.key, &raw) {
            Ok(()) => info!(key = %self.key, ts = snapshot.timestamp, "snapshot saved"),
            Err(err) => error!(key = %self.key, error = %err, "failed to save snapshot"),
        }
        Ok(())
    }

    pub fn load(&self) -> Option<Snapshot> {
        if !self.backend.is_available() {
            return None;
        }

        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                error!(key = %self.key, error = %err, "failed to load snapshot");
                return None;
            }
        };

        let stored_version = serde_json::from_str::<VersionProbe>(&raw)
            .ok()
            .and_then(|probe| probe.version);
        if stored_version.as_deref() != Some(self.version.as_str()) {
            warn!(
                stored = stored_version.as_deref().unwrap_or("none"),
                expected = %self.version,
                "stored data version mismatch, clearing old data"
            );
            self.clear();
            return None;
        }

        match serde_json::from_str::<PersistedEnvelope>(&raw) {
            Ok(envelope) => {
                info!(key = %self.key, "snapshot loaded");
                Some(envelope.snapshot)
            }
            Err(err) => {
                error!(key = %self.key, error = %err, "failed to decode stored snapshot");
                self.clear();
                None
            }
        }
    }

    pub fn clear(&self) {
        if !self.backend.is_available() {
            return;
        }
        match self.backend.remove(&self.key) {
            Ok(()) => info!(key = %self.key, "snapshot cleared"),
            Err(err) => error!(key = %self.key, error = %err, "failed to clear snapshot"),
        }
    }

    pub fn has_stored(&self) -> bool {
        if !self.backend.is_available() {
            return false;
        }
        matches!(self.backend.get(&self.key), Ok(Some(_)))
    }
}
