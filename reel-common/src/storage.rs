//! Key-value storage capability
//!
//! The catalog core only talks to durable local storage through
//! [`KeyValueStore`]. Two implementations are provided:
//! - [`MemoryStore`]: process-lifetime storage (session scope, tests)
//! - [`JsonFileStore`]: a JSON object map persisted to a single file
//!
//! Writes to [`JsonFileStore`] go to a temp file first and are renamed over
//! the target, so a crash mid-write never leaves a truncated cache.

use crate::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Catalog cache key (JSON array of videos)
pub const CATALOG_KEY: &str = "customVideos";

/// Last catalog cache value that could not be read as a video list
pub const CATALOG_BACKUP_KEY: &str = "customVideosBackup";

/// Session authentication flag key (`"true"` once authenticated)
pub const ADMIN_AUTH_KEY: &str = "adminAuth";

/// Remote document identifier used for authenticated writes
pub const REMOTE_DOCUMENT_ID_KEY: &str = "gistId";

/// Remote write token
pub const REMOTE_TOKEN_KEY: &str = "githubToken";

/// Synchronous string key-value storage
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key was never set
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, overwriting any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key (no-op if absent)
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| Error::Storage(format!("memory store poisoned: {}", e)))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// File-backed store holding a flat JSON object of string values
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`
    ///
    /// A missing file starts empty. A corrupt file is logged and treated as
    /// empty; it is replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Cache file unreadable, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(Error::Io(e)),
        };

        debug!(path = %path.display(), keys = entries.len(), "Opened key-value store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(entries)?;
        write_atomic(&self.path, content.as_bytes())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| Error::Storage(format!("file store poisoned: {}", e)))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    // Memory only changes once the file write has succeeded
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.lock()?;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.lock()?;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }
}

/// Write `bytes` to `target` via `<target>.tmp` + rename
pub fn write_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut tmp = target.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, bytes)?;
    if let Err(e) = std::fs::rename(&tmp, target) {
        let _ = std::fs::remove_file(&tmp);
        return Err(Error::Io(e));
    }
    Ok(())
}
