//! Application registry.
//!
//! Holds the configured applications and their display order, keeps the two
//! in agreement, and writes the whole registry back to disk after every
//! mutation. Validation happens before anything is touched, so a rejected
//! call leaves both memory and disk unchanged.

mod migrate;
mod types;

pub use migrate::{migrate, MigrationAction, Migrated, StoredRegistry};
pub use types::{AppRecord, CanonicalRegistry};

use crate::error::{Error, Result};
use crate::store::JsonStore;
use std::path::{Path, PathBuf};

/// Which files count as launchers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherPolicy {
    /// Accepted file extensions, without the leading dot (case-sensitive)
    pub extensions: Vec<String>,
}

impl LauncherPolicy {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.into().trim_start_matches('.').to_string())
                .collect(),
        }
    }

    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed == ext))
    }

    fn describe(&self) -> String {
        self.extensions
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for LauncherPolicy {
    #[cfg(windows)]
    fn default() -> Self {
        Self::new(["bat", "cmd"])
    }

    #[cfg(not(windows))]
    fn default() -> Self {
        Self::new(["sh"])
    }
}

/// Parse a port given as free text. Blank means "no port".
pub fn parse_port(raw: Option<&str>) -> Result<Option<u16>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u16>()
        .map(Some)
        .map_err(|_| Error::InvalidPort(raw.to_string()))
}

/// The authoritative, persisted set of managed applications.
#[derive(Debug)]
pub struct Registry {
    store: JsonStore,
    policy: LauncherPolicy,
    state: CanonicalRegistry,
}

impl Registry {
    /// Load the registry file, migrating it to the current schema.
    ///
    /// A migrated registry is written back immediately. A failed write is
    /// logged and the migrated form is still used in memory.
    pub fn load(store: JsonStore, policy: LauncherPolicy) -> Self {
        let migrated = migrate(store.load_value());

        if migrated.needs_persist() {
            tracing::info!(
                "Migrating {} ({:?}, {} application(s))",
                store.path().display(),
                migrated.action,
                migrated.registry.len()
            );
            // save() already logs the failure
            let _ = store.save(&migrated.registry);
        }

        Self {
            store,
            policy,
            state: migrated.registry,
        }
    }

    /// Snapshot of the registry in its persisted shape.
    pub fn list(&self) -> CanonicalRegistry {
        self.state.clone()
    }

    pub fn get(&self, name: &str) -> Option<&AppRecord> {
        self.state.apps.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.state.apps.contains_key(name)
    }

    /// Names in display order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.state.order.iter().map(String::as_str)
    }

    /// Records in display order.
    pub fn ordered(&self) -> impl Iterator<Item = (&str, &AppRecord)> {
        self.state.ordered()
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn policy(&self) -> &LauncherPolicy {
        &self.policy
    }

    /// Check a new registration without changing anything.
    ///
    /// Checks run in a fixed order: name, path shape, path existence, port.
    pub fn validate_new(&self, name: &str, path: &str, port: Option<&str>) -> Result<AppRecord> {
        if self.contains(name) {
            return Err(Error::DuplicateName(name.to_string()));
        }

        let launcher = PathBuf::from(path);
        if !launcher.is_absolute() {
            return Err(Error::InvalidPath {
                path: launcher,
                reason: "the launcher path must be absolute".to_string(),
            });
        }
        if !self.policy.accepts(&launcher) {
            return Err(Error::InvalidPath {
                path: launcher,
                reason: format!("expected a launcher file ({})", self.policy.describe()),
            });
        }
        if !launcher.exists() {
            return Err(Error::PathNotFound(launcher));
        }

        let port = parse_port(port)?;
        Ok(AppRecord::new(launcher, port))
    }

    /// Register a new application and persist.
    pub fn add(&mut self, name: &str, path: &str, port: Option<&str>) -> Result<()> {
        let record = self.validate_new(name, path, port)?;

        tracing::debug!("Registering '{}' -> {}", name, record.path.display());
        self.state.apps.insert(name.to_string(), record);
        self.state.order.push(name.to_string());
        self.persist()
    }

    /// Remove an application from records and order, then persist.
    ///
    /// On `PersistenceFailed` the removal has still happened in memory.
    pub fn remove(&mut self, name: &str) -> Result<AppRecord> {
        let record = self
            .state
            .apps
            .remove(name)
            .ok_or_else(|| Error::UnknownApplication(name.to_string()))?;
        self.state.order.retain(|entry| entry != name);

        self.persist()?;
        Ok(record)
    }

    /// Replace the display order. The new order must be a permutation of
    /// the registered names.
    pub fn reorder(&mut self, new_order: Vec<String>) -> Result<()> {
        if !types::order_matches(&new_order, self.state.apps.keys().map(String::as_str)) {
            return Err(Error::OrderMismatch);
        }

        self.state.order = new_order;
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        debug_assert!(self.state.is_consistent());
        self.store.save(&self.state)
    }
}
