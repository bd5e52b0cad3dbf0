//! Durable key/value storage
//!
//! The terminal counterpart of browser local storage: string values under
//! string keys, all kept in one JSON object file. Every write replaces the
//! whole file through a temp file in the same directory followed by a
//! rename, so a reader sees either the old document or the new one.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{debug, warn};

/// Storage file name inside the storage directory
pub const STORAGE_FILE: &str = "storage.json";

/// Errors from durable storage
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage document is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Storage is unavailable: {0}")]
    Unavailable(String),
}

/// String key/value store shared by the selection and preference stores
pub trait Storage: Send + Sync {
    /// Read a value; a missing key is `Ok(None)`
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, durable before returning
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// JSON-file backed storage
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Open storage in the given directory, creating it if needed
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        debug!(?dir, "FileStorage::open: called");
        std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: dir.join(STORAGE_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(StorageError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Read for modification; a corrupt document is replaced rather than blocking writes
    fn read_document_for_write(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.read_document() {
            Err(StorageError::Serde(e)) => {
                warn!(path = %self.path.display(), error = %e, "Corrupt storage document, starting fresh");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn write_document(&self, doc: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        serde_json::to_writer_pretty(&mut tmp, doc)?;
        tmp.write_all(b"\n").map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        debug!(%key, "FileStorage::get: called");
        Ok(self.read_document()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        debug!(%key, value_len = value.len(), "FileStorage::set: called");
        let mut doc = self.read_document_for_write()?;
        doc.insert(key.to_string(), value.to_string());
        self.write_document(&doc)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        debug!(%key, "FileStorage::remove: called");
        let mut doc = self.read_document_for_write()?;
        if doc.remove(key).is_none() {
            return Ok(());
        }
        self.write_document(&doc)
    }
}

/// In-memory storage for tests and ephemeral sessions
///
/// Clones share the same map, which stands in for "the same browser profile".
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: Arc<Mutex<BTreeMap<String, String>>>,
    read_only: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects every write
    pub fn read_only() -> Self {
        Self {
            values: Arc::default(),
            read_only: true,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, StorageError> {
        self.values
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".to_string()))
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Unavailable("storage is read-only".to_string()));
        }
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.lock()?.remove(key);
        Ok(())
    }
}
