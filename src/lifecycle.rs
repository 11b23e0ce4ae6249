//! Start and stop for managed applications.
//!
//! An application is Running only while its tracked PID is confirmed alive;
//! every other state is Stopped. Both operations are idempotent: starting a
//! running application and stopping a stopped one succeed without touching
//! the OS.

use crate::error::{Error, Result};
use crate::process::{ProcessHost, TerminateError};
use crate::reconcile::query_liveness;
use crate::registry::Registry;
use crate::tracker::ProcessTracker;
use std::time::Duration;
use tokio::time::timeout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    AlreadyRunning { pid: u32 },
    Started { pid: u32 },
}

impl StartOutcome {
    pub fn pid(&self) -> u32 {
        match self {
            StartOutcome::AlreadyRunning { pid } | StartOutcome::Started { pid } => *pid,
        }
    }

    pub fn describe(&self, name: &str) -> String {
        match self {
            StartOutcome::AlreadyRunning { .. } => format!("{} is already running.", name),
            StartOutcome::Started { pid } => format!("Started {} with PID: {}", name, pid),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    NotTracked,
    Stopped { pid: u32 },
    AlreadyGone { pid: u32 },
}

impl StopOutcome {
    pub fn describe(&self, name: &str) -> String {
        match self {
            StopOutcome::NotTracked => format!("{} is not running or not tracked.", name),
            StopOutcome::Stopped { pid } => {
                format!("Sent stop signal to {} (PID: {}).", name, pid)
            }
            StopOutcome::AlreadyGone { pid } => format!(
                "Process for {} (PID: {}) not found. Already stopped.",
                name, pid
            ),
        }
    }
}

/// Lifecycle operations over borrowed panel state.
///
/// Built per call while the panel lock is held, so the registry and tracker
/// cannot change underneath an operation.
pub struct LifecycleController<'a> {
    registry: &'a Registry,
    tracker: &'a mut ProcessTracker,
    host: &'a dyn ProcessHost,
    query_timeout: Duration,
    terminate_timeout: Duration,
}

impl<'a> LifecycleController<'a> {
    pub fn new(
        registry: &'a Registry,
        tracker: &'a mut ProcessTracker,
        host: &'a dyn ProcessHost,
        query_timeout: Duration,
        terminate_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            tracker,
            host,
            query_timeout,
            terminate_timeout,
        }
    }

    /// Start `name` unless its tracked PID is confirmed alive.
    pub async fn start(&mut self, name: &str) -> Result<StartOutcome> {
        let record = self
            .registry
            .get(name)
            .ok_or_else(|| Error::UnknownApplication(name.to_string()))?;

        if let Some(pid) = self.tracker.get(name) {
            if query_liveness(self.host, pid, self.query_timeout).await.is_alive() {
                tracing::debug!("'{}' already running as PID {}", name, pid);
                return Ok(StartOutcome::AlreadyRunning { pid });
            }
        }

        if !record.path.exists() {
            return Err(Error::LauncherMissing {
                name: name.to_string(),
                path: record.path.clone(),
            });
        }

        let pid = self
            .host
            .spawn_detached(&record.path, &record.cwd)
            .await
            .map_err(|e| Error::SpawnFailed {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!("Started '{}' with PID {}", name, pid);
        // A stale PID from a dead run is simply overwritten
        self.tracker.set(name, pid)?;
        Ok(StartOutcome::Started { pid })
    }

    /// Forcefully stop `name` and its process subtree.
    ///
    /// The tracker entry is cleared only when the process is known to be
    /// gone; on failure it stays so the next status query can re-check it.
    pub async fn stop(&mut self, name: &str) -> Result<StopOutcome> {
        if !self.registry.contains(name) {
            return Err(Error::UnknownApplication(name.to_string()));
        }

        let Some(pid) = self.tracker.get(name) else {
            return Ok(StopOutcome::NotTracked);
        };

        let result = match timeout(self.terminate_timeout, self.host.terminate(pid)).await {
            Ok(result) => result,
            Err(_) => Err(TerminateError::Failed(format!(
                "termination timed out after {:?}",
                self.terminate_timeout
            ))),
        };

        let outcome = match result {
            Ok(()) => {
                tracing::info!("Stopped '{}' (PID {})", name, pid);
                StopOutcome::Stopped { pid }
            }
            Err(TerminateError::NotFound) => {
                tracing::info!("'{}' (PID {}) was already gone", name, pid);
                StopOutcome::AlreadyGone { pid }
            }
            Err(TerminateError::Failed(reason)) => {
                tracing::warn!("Failed to stop '{}' (PID {}): {}", name, pid, reason);
                return Err(Error::TerminationFailed {
                    name: name.to_string(),
                    pid,
                    reason,
                });
            }
        };

        self.tracker.remove(name)?;
        Ok(outcome)
    }
}
