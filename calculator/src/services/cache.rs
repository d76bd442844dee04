//! # Local Store
//!
//! Keyed string storage persisted as one JSON file, the offline mirror of the
//! backend. Values are stored as strings (rates are serialized JSON, the logo
//! is a data URI) so the file reads like a browser's local storage dump:
//!
//! ```text
//! {
//!   "istore_rates": "{\"1\":0.0,\"2\":4.0}",
//!   "istore_custom_logo": "data:image/png;base64,iVBORw0KGgo..."
//! }
//! ```
//!
//! Reads never fail: a missing or corrupt file behaves as an empty store.
//! Several processes may share one store (a long-running `watch` beside a
//! `login`); every write merges its single key into the file under a lock.

use crate::core::error::{AppError, Result};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Well-known entry keys.
pub mod keys {
    /// Serialized rate table
    pub const RATES: &str = "istore_rates";
    /// Logo data URI
    pub const LOGO: &str = "istore_custom_logo";
    /// Serialized admin session
    pub const SESSION: &str = "istore_session";
}

const STORE_FILE: &str = "local-storage.json";
const LOCK_FILE: &str = "local-storage.lock";

/// File-backed key/value store.
pub struct LocalStore {
    path: Option<PathBuf>,
    entries: RwLock<BTreeMap<String, String>>,
}

impl LocalStore {
    /// Open (or lazily create) the store inside `dir`.
    pub fn open(dir: &Path) -> Self {
        let path = dir.join(STORE_FILE);
        let entries = load_entries(&path);
        tracing::debug!(path = %path.display(), entries = entries.len(), "Local store opened");

        Self {
            path: Some(path),
            entries: RwLock::new(entries),
        }
    }

    /// Store that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    /// Apply one change. A file-backed store re-reads the file under an
    /// exclusive lock first so entries written by other processes survive.
    fn update(&self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let mut entries = self.entries.write();
        let Some(path) = &self.path else {
            change(&mut *entries);
            return Ok(());
        };

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)
            .map_err(|e| AppError::Cache(format!("Failed to create {}: {}", dir.display(), e)))?;

        let lock_path = dir.join(LOCK_FILE);
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)
            .map_err(|e| AppError::Cache(format!("Failed to open {}: {}", lock_path.display(), e)))?;
        let mut lock = fd_lock::RwLock::new(lock_file);
        let _guard = lock
            .write()
            .map_err(|e| AppError::Cache(format!("Failed to lock {}: {}", lock_path.display(), e)))?;

        let mut merged = load_entries(path);
        change(&mut merged);
        write_atomic(path, dir, &merged)?;
        *entries = merged;
        Ok(())
    }
}

/// Write through a uniquely named temporary file so a crash never leaves a torn store.
fn write_atomic(path: &Path, dir: &Path, entries: &BTreeMap<String, String>) -> Result<()> {
    let content = serde_json::to_string_pretty(entries)
        .map_err(|e| AppError::Cache(format!("Failed to serialize local store: {}", e)))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| AppError::Cache(format!("Failed to create temp file in {}: {}", dir.display(), e)))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| AppError::Cache(format!("Failed to write {}: {}", tmp.path().display(), e)))?;
    tmp.persist(path)
        .map_err(|e| AppError::Cache(format!("Failed to replace {}: {}", path.display(), e.error)))?;

    Ok(())
}

fn load_entries(path: &Path) -> BTreeMap<String, String> {
    if !path.exists() {
        return BTreeMap::new();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read local store. Starting empty.");
            return BTreeMap::new();
        }
    };

    match serde_json::from_str(&content) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Corrupt local store. Starting empty.");
            BTreeMap::new()
        }
    }
}
