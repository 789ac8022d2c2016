//! Local key-value storage
//!
//! The recovery and detection services persist small JSON strings under
//! fixed keys. Hosts inject one of the stores below (or their own) behind
//! the `KeyValueStore` trait.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Key holding the single current recovery snapshot
pub const SNAPSHOT_KEY: &str = "mirror_recovery_snapshot";
/// Key holding the capped snapshot history
pub const HISTORY_KEY: &str = "mirror_recovery_snapshot_history";
/// Key holding the epoch-millisecond timestamp of the last banner dismissal
pub const DISMISSAL_KEY: &str = "crisis_banner_dismissed";

/// A string key-value store with local durability.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Read the value at `key`, `Ok(None)` if absent.
    fn get(&self, key: &str) -> io::Result<Option<String>>;

    /// Write `value` at `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> io::Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// Type alias for a shared store.
pub type SharedStore = Arc<dyn KeyValueStore>;

fn lock_poisoned() -> io::Error {
    io::Error::other("storage lock poisoned")
}

/// In-memory store, optionally with a byte quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    /// Maximum total bytes (keys + values); `None` is unbounded
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes once `quota_bytes` would be exceeded
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        match self.entries.lock() {
            Ok(entries) => entries.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| lock_poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self.entries.lock().map_err(|_| lock_poisoned())?;

        if let Some(quota) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(io::Error::other(format!(
                    "storage quota exceeded: {needed} bytes needed, {quota} allowed"
                )));
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let mut entries = self.entries.lock().map_err(|_| lock_poisoned())?;
        entries.remove(key);
        Ok(())
    }
}

/// Directory-backed store: one `{key}.json` file per key.
///
/// Writes go to a temp file and are renamed into place so a crash mid-write
/// never leaves a truncated value behind.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// File extension for stored values
    const VALUE_EXT: &'static str = "json";

    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    fn value_path(&self, key: &str) -> io::Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid storage key: {key:?}"),
            ));
        }
        Ok(self.dir.join(format!("{key}.{}", Self::VALUE_EXT)))
    }

    fn atomic_write(&self, target: &Path, content: &[u8]) -> io::Result<()> {
        let temp_path = target.with_extension("tmp");

        let mut file = File::create(&temp_path)?;
        file.write_all(content)?;
        drop(file);

        fs::rename(&temp_path, target)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let path = self.value_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let path = self.value_path(key)?;
        self.ensure_dir()?;
        self.atomic_write(&path, value.as_bytes())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let path = self.value_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
