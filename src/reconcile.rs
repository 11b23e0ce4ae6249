//! Liveness reconciliation.
//!
//! A status query is the only place tracked PIDs are checked against the OS.
//! Anything not confirmed alive is forgotten in one batched write after the
//! whole pass.

use crate::process::{Liveness, ProcessHost};
use crate::registry::Registry;
use crate::tracker::ProcessTracker;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::timeout;

/// Per-application status as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppStatus {
    pub running: bool,
    pub pid: Option<u32>,
    pub port: Option<u16>,
}

pub type StatusReport = BTreeMap<String, AppStatus>;

/// Ask the host about `pid`, treating a slow answer as unconfirmable.
pub(crate) async fn query_liveness(host: &dyn ProcessHost, pid: u32, query_timeout: Duration) -> Liveness {
    match timeout(query_timeout, host.is_alive(pid)).await {
        Ok(liveness) => liveness,
        Err(_) => Liveness::Unconfirmed(format!(
            "liveness query timed out after {:?}",
            query_timeout
        )),
    }
}

/// Build a status report for every registered application and prune tracked
/// PIDs that are not confirmed alive.
///
/// The registry is only read. A failed write of the pruned tracker is
/// logged; the report is returned regardless.
pub async fn reconcile(
    registry: &Registry,
    tracker: &mut ProcessTracker,
    host: &dyn ProcessHost,
    query_timeout: Duration,
) -> StatusReport {
    let mut report = StatusReport::new();
    let mut stale: Vec<String> = Vec::new();

    for (name, record) in registry.ordered() {
        let mut status = AppStatus {
            running: false,
            pid: None,
            port: record.port,
        };

        if let Some(pid) = tracker.get(name) {
            match query_liveness(host, pid, query_timeout).await {
                Liveness::Alive => {
                    status.running = true;
                    status.pid = Some(pid);
                }
                Liveness::Gone => {
                    tracing::debug!("'{}' (PID {}) is no longer running", name, pid);
                    stale.push(name.to_string());
                }
                Liveness::Unconfirmed(reason) => {
                    tracing::warn!(
                        "Could not confirm '{}' (PID {}) is alive: {}. Treating it as stopped",
                        name,
                        pid,
                        reason
                    );
                    stale.push(name.to_string());
                }
            }
        }

        report.insert(name.to_string(), status);
    }

    if let Err(e) = tracker.remove_many(stale.iter().map(String::as_str)) {
        tracing::error!("Failed to prune stale PIDs: {}", e);
    }

    report
}
