//! Process table: application name -> last known OS process ID.
//!
//! Entries are only hints. Nothing here checks liveness; the reconciler and
//! the lifecycle controller do that before trusting an entry.

use crate::error::Result;
use crate::store::JsonStore;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct ProcessTracker {
    store: JsonStore,
    pids: BTreeMap<String, u32>,
}

impl ProcessTracker {
    /// Load the process table. Entries that are not positive integers are
    /// dropped; a missing or corrupt file yields an empty table.
    pub fn load(store: JsonStore) -> Self {
        let pids = match store.load_value() {
            Value::Object(entries) => entries
                .into_iter()
                .filter_map(|(name, value)| match parse_pid(&value) {
                    Some(pid) => Some((name, pid)),
                    None => {
                        tracing::warn!("Ignoring tracked PID for '{}': {} is not a PID", name, value);
                        None
                    }
                })
                .collect(),
            Value::Null => BTreeMap::new(),
            other => {
                tracing::warn!(
                    "{} is not a mapping ({}), starting with an empty process table",
                    store.path().display(),
                    other
                );
                BTreeMap::new()
            }
        };

        Self { store, pids }
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.pids.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pids.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.pids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }

    /// Snapshot of all entries.
    pub fn entries(&self) -> BTreeMap<String, u32> {
        self.pids.clone()
    }

    /// Record a PID for an application and persist.
    pub fn set(&mut self, name: &str, pid: u32) -> Result<()> {
        tracing::debug!("Tracking '{}' as PID {}", name, pid);
        self.pids.insert(name.to_string(), pid);
        self.persist()
    }

    /// Forget an application's PID. Persists only when an entry existed.
    pub fn remove(&mut self, name: &str) -> Result<Option<u32>> {
        let removed = self.pids.remove(name);
        if removed.is_some() {
            tracing::debug!("Untracking '{}'", name);
            self.persist()?;
        }
        Ok(removed)
    }

    /// Forget several entries with a single write.
    ///
    /// Returns how many entries were actually removed; nothing is written
    /// when that is zero.
    pub fn remove_many<'a, I>(&mut self, names: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let removed = names
            .into_iter()
            .filter(|name| self.pids.remove(*name).is_some())
            .count();

        if removed > 0 {
            tracing::debug!("Untracked {} stale PID(s)", removed);
            self.persist()?;
        }
        Ok(removed)
    }

    fn persist(&self) -> Result<()> {
        self.store.save(&self.pids)
    }
}

fn parse_pid(value: &Value) -> Option<u32> {
    value
        .as_u64()
        .filter(|pid| *pid > 0)
        .and_then(|pid| u32::try_from(pid).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tracker_in(dir: &tempfile::TempDir) -> ProcessTracker {
        ProcessTracker::load(JsonStore::new(dir.path().join("processes.json")))
    }

    #[test]
    fn set_and_remove_persist() {
        let dir = tempfile::tempdir().unwrap();
        let mut tracker = tracker_in(&dir);

        tracker.set("web", 4242).unwrap();
        assert_eq!(tracker_in(&dir).get("web"), Some(4242));

        assert_eq!(tracker.remove("web").unwrap(), Some(4242));
        assert!(tracker_in(&dir).is_empty());
    }

    #[test]
    fn remove_absent_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let mut tracker = tracker_in(&dir);

        assert_eq!(tracker.remove("ghost").unwrap(), None);
        assert!(!dir.path().join("processes.json").exists());
    }

    #[test]
    fn remove_many_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut tracker = tracker_in(&dir);
        tracker.set("a", 10).unwrap();
        tracker.set("b", 11).unwrap();
        tracker.set("c", 12).unwrap();

        let removed = tracker.remove_many(["a", "c", "ghost"]).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(tracker_in(&dir).entries().into_keys().collect::<Vec<_>>(), ["b"]);
    }

    #[test]
    fn load_skips_invalid_entries() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("processes.json"),
            r#"{"web": 4242, "zero": 0, "neg": -5, "text": "12", "huge": 99999999999}"#,
        )
        .unwrap();

        let tracker = tracker_in(&dir);
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.get("web"), Some(4242));
    }

    #[test]
    fn load_non_mapping_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("processes.json"), "[4242]").unwrap();
        assert!(tracker_in(&dir).is_empty());
    }
}
