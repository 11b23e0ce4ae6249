// Allow unused_assignments at module level because thiserror's generated code
// for struct variants triggers false positive warnings - the fields ARE used
// in the Display impl but rustc's lint pass doesn't see this.
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Application '{0}' already exists.")]
    #[diagnostic(
        code(remote_starter::registry::duplicate_name),
        help("Pick another name or delete the existing application first")
    )]
    DuplicateName(String),

    #[error("Invalid path '{}': {reason}", .path.display())]
    #[diagnostic(
        code(remote_starter::registry::invalid_path),
        help("Provide an absolute path to a launcher script")
    )]
    InvalidPath { path: PathBuf, reason: String },

    #[error("File not found at path: {}", .0.display())]
    #[diagnostic(code(remote_starter::registry::path_not_found))]
    PathNotFound(PathBuf),

    #[error("Invalid port number: {0}")]
    #[diagnostic(
        code(remote_starter::registry::invalid_port),
        help("Ports are integers between 0 and 65535, or leave the field empty")
    )]
    InvalidPort(String),

    #[error("Application not found: {0}")]
    #[diagnostic(
        code(remote_starter::app::unknown),
        help("List registered applications with `remote-starter list`")
    )]
    UnknownApplication(String),

    #[error("Launcher not found: {}", .path.display())]
    #[diagnostic(
        code(remote_starter::app::launcher_missing),
        help("The launcher was moved or deleted after '{name}' was registered")
    )]
    LauncherMissing { name: String, path: PathBuf },

    #[error("Failed to start {name}: {reason}")]
    #[diagnostic(
        code(remote_starter::process::spawn_failed),
        help("Check that the launcher is executable and its working directory exists")
    )]
    SpawnFailed { name: String, reason: String },

    #[error("Failed to stop {name} (PID: {pid}): {reason}")]
    #[diagnostic(code(remote_starter::process::termination_failed))]
    TerminationFailed {
        name: String,
        pid: u32,
        reason: String,
    },

    #[error("Order data does not match current apps")]
    #[diagnostic(
        code(remote_starter::registry::order_mismatch),
        help("A new order must contain every registered application exactly once")
    )]
    OrderMismatch,

    #[error("Failed to save {}: {reason}", .path.display())]
    #[diagnostic(
        code(remote_starter::store::persistence_failed),
        help("Check free disk space and permissions on the data directory")
    )]
    PersistenceFailed { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(remote_starter::config::error))]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid PID {pid}: {reason}")]
    InvalidPid { pid: u32, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Stable snake_case tag used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::DuplicateName(_) => "duplicate_name",
            Error::InvalidPath { .. } => "invalid_path",
            Error::PathNotFound(_) => "path_not_found",
            Error::InvalidPort(_) => "invalid_port",
            Error::UnknownApplication(_) => "unknown_application",
            Error::LauncherMissing { .. } => "launcher_missing",
            Error::SpawnFailed { .. } => "spawn_failed",
            Error::TerminationFailed { .. } => "termination_failed",
            Error::OrderMismatch => "order_mismatch",
            Error::PersistenceFailed { .. } => "persistence_failed",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::InvalidPid { .. } => "invalid_pid",
        }
    }

    /// True for errors raised before any state was touched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::DuplicateName(_)
                | Error::InvalidPath { .. }
                | Error::PathNotFound(_)
                | Error::InvalidPort(_)
                | Error::OrderMismatch
        )
    }

    /// Returns a helpful suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Error::UnknownApplication(name) => Some(format!(
                "'{}' is not registered. Run `remote-starter list` to see registered applications.",
                name
            )),
            Error::LauncherMissing { name, path } => Some(format!(
                "Restore {} or delete '{}' and register it again with the new path.",
                path.display(),
                name
            )),
            Error::TerminationFailed { pid, .. } => Some(format!(
                "The tracked PID {} is kept; the next status query re-checks whether it is alive.",
                pid
            )),
            Error::PersistenceFailed { .. } => Some(
                "The change is active in memory but will be lost on restart until the file can be written.".to_string()
            ),
            Error::Config(_) => Some(
                "Check remote-starter.yaml or pass --config with the right file".to_string()
            ),
            _ => None,
        }
    }

    /// Formats the error with its suggestion (if any) for user-friendly display.
    pub fn with_suggestion(&self) -> String {
        match self.suggestion() {
            Some(suggestion) => format!("{}\n\nHint: {}", self, suggestion),
            None => self.to_string(),
        }
    }
}

/// Validates and converts a u32 PID to nix::unistd::Pid safely.
/// Returns Err for PID 0 (process group), PID 1 (init), or values > i32::MAX.
#[cfg(unix)]
pub fn validate_pid(pid: u32, app_name: &str) -> Result<nix::unistd::Pid> {
    if pid == 0 {
        return Err(Error::InvalidPid {
            pid,
            reason: format!(
                "PID 0 is invalid for '{}' (refers to process group, not a process)",
                app_name
            ),
        });
    }
    if pid == 1 {
        return Err(Error::InvalidPid {
            pid,
            reason: format!("refusing to signal PID 1 (init) for '{}'", app_name),
        });
    }
    if pid > i32::MAX as u32 {
        return Err(Error::InvalidPid {
            pid,
            reason: format!(
                "PID {} exceeds i32::MAX for '{}', cannot convert safely",
                pid, app_name
            ),
        });
    }
    Ok(nix::unistd::Pid::from_raw(pid as i32))
}

/// Same as validate_pid but allows PID 1 for existence checks.
/// Use validate_pid for signal operations; use this for read-only checks.
#[cfg(unix)]
pub fn validate_pid_for_check(pid: u32) -> Option<nix::unistd::Pid> {
    if pid == 0 || pid > i32::MAX as u32 {
        return None;
    }
    Some(nix::unistd::Pid::from_raw(pid as i32))
}
