//! OS process capability.
//!
//! Everything the panel needs from the operating system goes through
//! [`ProcessHost`]: asking whether a PID is alive, killing a PID with its
//! subtree, and spawning a detached launcher. The platform implementation is
//! [`SystemHost`]; tests substitute a fake.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

mod tasklist;
#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::UnixHost as SystemHost;
#[cfg(windows)]
pub use windows::WindowsHost as SystemHost;

/// Answer to "is this PID a live process?"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    Gone,
    /// The OS could not be asked (tool missing, access denied, timeout, ...)
    Unconfirmed(String),
}

impl Liveness {
    /// Only a confirmed answer counts as running.
    pub fn is_alive(&self) -> bool {
        matches!(self, Liveness::Alive)
    }
}

/// Why a termination request did not succeed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TerminateError {
    /// The target no longer exists. Callers treat this as already stopped.
    #[error("process not found")]
    NotFound,

    #[error("{0}")]
    Failed(String),
}

#[async_trait]
pub trait ProcessHost: Send + Sync {
    /// Check whether `pid` currently denotes a live process.
    async fn is_alive(&self, pid: u32) -> Liveness;

    /// Forcefully terminate `pid` and, where supported, its process subtree.
    async fn terminate(&self, pid: u32) -> Result<(), TerminateError>;

    /// Start `launcher` in `cwd`, detached from this process's lifetime, and
    /// return the new process ID without waiting on it.
    async fn spawn_detached(&self, launcher: &Path, cwd: &Path) -> std::io::Result<u32>;
}
