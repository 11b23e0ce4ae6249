//! File-backed JSON records.
//!
//! Both persisted records (the application registry and the process table)
//! go through [`JsonStore`]. Loading never fails: a missing, unreadable or
//! malformed file yields the caller's default so the panel can bootstrap from
//! nothing. Saving replaces the whole file with write-then-rename, so a reader
//! never observes a half-written record.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw document.
    ///
    /// Returns `Value::Null` when the file does not exist, cannot be read, or
    /// is not valid JSON. Object key order from the file is preserved.
    pub fn load_value(&self) -> Value {
        // Directly try to read the file - avoid TOCTOU race
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("{} does not exist yet, using defaults", self.path.display());
                return Value::Null;
            }
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", self.path.display(), e);
                return Value::Null;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    "{} is not valid JSON ({}), falling back to defaults",
                    self.path.display(),
                    e
                );
                Value::Null
            }
        }
    }

    /// Read and deserialize the document, or return `T::default()`.
    pub fn load_or_default<T>(&self) -> T
    where
        T: DeserializeOwned + Default,
    {
        match self.load_value() {
            Value::Null => T::default(),
            value => serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::warn!(
                    "{} has an unexpected shape ({}), falling back to defaults",
                    self.path.display(),
                    e
                );
                T::default()
            }),
        }
    }

    /// Replace the document on disk.
    ///
    /// Failures are logged and returned as [`Error::PersistenceFailed`]; the
    /// caller decides whether to surface them.
    pub fn save<T: Serialize + ?Sized>(&self, record: &T) -> Result<()> {
        let result = serde_json::to_string_pretty(record)
            .map_err(|e| e.to_string())
            .and_then(|contents| self.atomic_write(&contents).map_err(|e| e.to_string()));

        result.map_err(|reason| {
            tracing::error!("Error saving {}: {}", self.path.display(), reason);
            Error::PersistenceFailed {
                path: self.path.clone(),
                reason,
            }
        })
    }

    /// Atomic file write using write-then-rename pattern
    /// This prevents file corruption if the process crashes during write
    fn atomic_write(&self, contents: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        let result = Self::write_synced(&temp_path, contents)
            .and_then(|()| fs::rename(&temp_path, &self.path));
        if result.is_err() {
            // Fails harmlessly when the temp file was never created
            let _ = fs::remove_file(&temp_path);
        }
        result
    }

    fn write_synced(path: &Path, contents: &str) -> std::io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;
        file.write_all(b"\n")?;

        // Ensure data is written to disk before rename
        file.sync_all()
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("processes.json"));

        assert_eq!(store.load_value(), Value::Null);
        let pids: BTreeMap<String, u32> = store.load_or_default();
        assert!(pids.is_empty());
    }

    #[test]
    fn corrupt_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processes.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonStore::new(&path);
        assert_eq!(store.load_value(), Value::Null);
        let pids: BTreeMap<String, u32> = store.load_or_default();
        assert!(pids.is_empty());
    }

    #[test]
    fn wrong_shape_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processes.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let pids: BTreeMap<String, u32> = JsonStore::new(&path).load_or_default();
        assert!(pids.is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("nested").join("processes.json"));

        let mut pids = BTreeMap::new();
        pids.insert("web".to_string(), 4242u32);
        store.save(&pids).unwrap();

        let loaded: BTreeMap<String, u32> = store.load_or_default();
        assert_eq!(loaded, pids);
        assert!(!dir.path().join("nested").join("processes.json.tmp").exists());
    }

    #[test]
    fn save_keeps_non_ascii_text() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("config.json"));
        let mut names = BTreeMap::new();
        names.insert("サーバー".to_string(), 1u32);
        store.save(&names).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("サーバー"));
    }

    #[test]
    fn save_into_unwritable_location_reports_persistence_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where a directory is expected
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let store = JsonStore::new(blocker.join("config.json"));

        let err = store.save(&BTreeMap::<String, u32>::new()).unwrap_err();
        assert!(matches!(err, Error::PersistenceFailed { .. }));
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the target path makes the final rename fail
        let target = dir.path().join("processes.json");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "").unwrap();
        let store = JsonStore::new(&target);

        let err = store.save(&BTreeMap::<String, u32>::new()).unwrap_err();
        assert!(matches!(err, Error::PersistenceFailed { .. }));
        assert!(!dir.path().join("processes.json.tmp").exists());
        assert!(target.join("keep").exists());
    }

    #[test]
    fn key_order_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"zeta": 1, "alpha": 2, "mid": 3}"#).unwrap();

        let value = JsonStore::new(&path).load_value();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }
}
