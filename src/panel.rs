//! The control panel handle.
//!
//! `ControlPanel` owns the registry and the process table behind one async
//! mutex and exposes the operations request handlers call. Each operation
//! holds the lock from start to finish, including its file writes, so
//! concurrent requests observe each other's effects in full or not at all.

use crate::config::PanelConfig;
use crate::error::{Error, Result};
use crate::lifecycle::{LifecycleController, StartOutcome, StopOutcome};
use crate::process::ProcessHost;
use crate::reconcile::{reconcile, StatusReport};
use crate::registry::{CanonicalRegistry, Registry};
use crate::store::JsonStore;
use crate::tracker::ProcessTracker;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

struct PanelState {
    registry: Registry,
    tracker: ProcessTracker,
}

pub struct ControlPanel {
    state: Mutex<PanelState>,
    host: Arc<dyn ProcessHost>,
    query_timeout: Duration,
    terminate_timeout: Duration,
}

impl ControlPanel {
    /// Load both stores and drop tracked PIDs for unregistered names.
    ///
    /// Never fails: unreadable files degrade to empty stores and write
    /// failures are logged.
    pub fn open(config: &PanelConfig, host: Arc<dyn ProcessHost>) -> Self {
        let registry = Registry::load(
            JsonStore::new(config.registry_path()),
            config.launcher_policy(),
        );
        let mut tracker = ProcessTracker::load(JsonStore::new(config.process_path()));

        let orphans: Vec<String> = tracker
            .entries()
            .into_keys()
            .filter(|name| !registry.contains(name))
            .collect();
        if !orphans.is_empty() {
            tracing::warn!(
                "Dropping tracked PIDs for unregistered application(s): {}",
                orphans.join(", ")
            );
            if let Err(e) = tracker.remove_many(orphans.iter().map(String::as_str)) {
                tracing::error!("Failed to persist pruned process table: {}", e);
            }
        }

        tracing::debug!(
            "Panel opened with {} application(s), {} tracked PID(s)",
            registry.len(),
            tracker.len()
        );

        Self {
            state: Mutex::new(PanelState { registry, tracker }),
            host,
            query_timeout: config.query_timeout(),
            terminate_timeout: config.terminate_timeout(),
        }
    }

    pub async fn list_applications(&self) -> CanonicalRegistry {
        self.state.lock().await.registry.list()
    }

    /// Reconcile tracked PIDs with the OS and report every application.
    pub async fn get_status(&self) -> StatusReport {
        let mut state = self.state.lock().await;
        let PanelState { registry, tracker } = &mut *state;
        reconcile(registry, tracker, self.host.as_ref(), self.query_timeout).await
    }

    pub async fn add_application(
        &self,
        name: &str,
        path: &str,
        port: Option<&str>,
    ) -> Result<String> {
        let mut state = self.state.lock().await;
        state.registry.add(name, path, port)?;
        tracing::info!("Added application '{}' ({})", name, path);
        Ok(format!("Application '{}' added successfully.", name))
    }

    /// Remove an application from both stores.
    ///
    /// A tracked process is stopped first on a best-effort basis; a failed
    /// stop is logged and does not block the deletion. A tracker write that
    /// failed during the stop is still reported as `PersistenceFailed`.
    pub async fn delete_application(&self, name: &str) -> Result<String> {
        let mut state = self.state.lock().await;
        if !state.registry.contains(name) {
            return Err(Error::UnknownApplication(name.to_string()));
        }

        let PanelState { registry, tracker } = &mut *state;
        // A stop that dropped the entry in memory but failed to write it
        // leaves nothing for the later tracker.remove to persist.
        let mut stop_persist_error = None;
        if tracker.contains(name) {
            match self.controller(registry, tracker).stop(name).await {
                Ok(_) => {}
                Err(e @ Error::PersistenceFailed { .. }) => stop_persist_error = Some(e),
                Err(e) => tracing::warn!("Deleting '{}' without a clean stop: {}", name, e),
            }
        }

        let registry_result = registry.remove(name);
        let tracker_result = tracker.remove(name);
        registry_result?;
        if let Some(e) = stop_persist_error {
            return Err(e);
        }
        tracker_result?;

        tracing::info!("Deleted application '{}'", name);
        Ok(format!("Application '{}' deleted.", name))
    }

    pub async fn save_order(&self, order: Vec<String>) -> Result<()> {
        let mut state = self.state.lock().await;
        state.registry.reorder(order)?;
        tracing::debug!("Saved new display order");
        Ok(())
    }

    pub async fn start_application(&self, name: &str) -> Result<StartOutcome> {
        let mut state = self.state.lock().await;
        let PanelState { registry, tracker } = &mut *state;
        self.controller(registry, tracker).start(name).await
    }

    pub async fn stop_application(&self, name: &str) -> Result<StopOutcome> {
        let mut state = self.state.lock().await;
        let PanelState { registry, tracker } = &mut *state;
        self.controller(registry, tracker).stop(name).await
    }

    fn controller<'a>(
        &'a self,
        registry: &'a Registry,
        tracker: &'a mut ProcessTracker,
    ) -> LifecycleController<'a> {
        LifecycleController::new(
            registry,
            tracker,
            self.host.as_ref(),
            self.query_timeout,
            self.terminate_timeout,
        )
    }
}
