//! Durable storage for the identity record.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use super::identity::Identity;
use crate::error::StorageError;

/// Synchronous key-value home of the persisted identity.
///
/// A missing record loads as `Ok(None)`; a record that exists but does not
/// deserialize loads as [`StorageError::Corrupt`].
pub trait IdentityStorage: Send + Sync + std::fmt::Debug {
    /// Read the stored identity.
    fn load(&self) -> Result<Option<Identity>, StorageError>;

    /// Replace the stored identity.
    fn save(&self, identity: &Identity) -> Result<(), StorageError>;

    /// Remove the stored identity. Removing an absent record succeeds.
    fn clear(&self) -> Result<(), StorageError>;
}

fn decode(raw: &str) -> Result<Identity, StorageError> {
    serde_json::from_str(raw).map_err(StorageError::Corrupt)
}

fn encode(identity: &Identity) -> Result<String, StorageError> {
    serde_json::to_string(identity).map_err(StorageError::Encode)
}

/// One JSON file per storage key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Store the record for `key` at `<dir>/<key>.json`.
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", key)),
        }
    }

    /// Location of the record on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdentityStorage for FileStorage {
    fn load(&self) -> Result<Option<Identity>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => decode(&raw).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, identity: &Identity) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, encode(identity)?)?;
        debug!(path = %self.path.display(), "saved identity");
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "cleared identity");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory string map standing in for browser-style local storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    key: String,
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Empty storage holding the identity under `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Storage that already holds `identity`.
    pub fn with_identity(key: impl Into<String>, identity: &Identity) -> Result<Self, StorageError> {
        let storage = Self::new(key);
        storage.save(identity)?;
        Ok(storage)
    }

    /// Raw stored value under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    /// Overwrite the raw value under `key`.
    pub fn set_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries().insert(key.into(), value.into());
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl IdentityStorage for MemoryStorage {
    fn load(&self) -> Result<Option<Identity>, StorageError> {
        self.raw(&self.key).as_deref().map(decode).transpose()
    }

    fn save(&self, identity: &Identity) -> Result<(), StorageError> {
        let raw = encode(identity)?;
        self.entries().insert(self.key.clone(), raw);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.entries().remove(&self.key);
        Ok(())
    }
}
