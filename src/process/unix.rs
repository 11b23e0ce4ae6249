use super::{Liveness, ProcessHost, TerminateError};
use crate::error::{validate_pid, validate_pid_for_check};
use async_trait::async_trait;
use nix::errno::Errno;
use nix::sys::signal::{self, killpg, Signal};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Shell used to run launcher scripts.
const LAUNCHER_SHELL: &str = "/bin/sh";

/// Process host backed by POSIX signals.
///
/// Each launcher is spawned as the leader of a new process group, so a stop
/// can take down the whole subtree with `killpg`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnixHost;

impl UnixHost {
    pub fn new() -> Self {
        Self
    }

    /// A zombie still answers `kill(pid, 0)` but is no longer running.
    #[cfg(target_os = "linux")]
    fn is_zombie(pid: u32) -> bool {
        let Ok(stat) = std::fs::read_to_string(format!("/proc/{}/stat", pid)) else {
            return false;
        };
        // The process name is in parens and may contain spaces, so parse
        // from the closing paren: ") <state> ..."
        stat.rfind(')')
            .and_then(|close| stat[close + 1..].split_whitespace().next())
            .is_some_and(|state| state == "Z")
    }

    #[cfg(not(target_os = "linux"))]
    fn is_zombie(_pid: u32) -> bool {
        false
    }
}

/// Map the result of `kill(pid, 0)` to a liveness answer.
///
/// Launchers run as our own user, so `EPERM` means the PID now belongs to
/// someone else's process and cannot be confirmed as ours.
fn liveness_from(signalled: nix::Result<()>, is_zombie: impl FnOnce() -> bool) -> Liveness {
    match signalled {
        Ok(()) if is_zombie() => Liveness::Gone,
        Ok(()) => Liveness::Alive,
        Err(Errno::ESRCH) => Liveness::Gone,
        Err(Errno::EPERM) => Liveness::Unconfirmed("permission denied".to_string()),
        Err(e) => Liveness::Unconfirmed(e.desc().to_string()),
    }
}

#[async_trait]
impl ProcessHost for UnixHost {
    async fn is_alive(&self, pid: u32) -> Liveness {
        let Some(nix_pid) = validate_pid_for_check(pid) else {
            return Liveness::Unconfirmed(format!("PID {} cannot be queried", pid));
        };

        // Signal 0 checks existence without delivering anything
        liveness_from(signal::kill(nix_pid, None), || Self::is_zombie(pid))
    }

    async fn terminate(&self, pid: u32) -> Result<(), TerminateError> {
        let nix_pid = validate_pid(pid, "launcher")
            .map_err(|e| TerminateError::Failed(e.to_string()))?;

        // Whole group first; fall back to the single process when the PID is
        // not a group leader.
        match killpg(nix_pid, Signal::SIGKILL) {
            Ok(()) => return Ok(()),
            Err(e) => tracing::debug!("killpg({}) failed: {}, trying the process alone", pid, e),
        }

        match signal::kill(nix_pid, Signal::SIGKILL) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) => Err(TerminateError::NotFound),
            Err(e) => Err(TerminateError::Failed(e.desc().to_string())),
        }
    }

    async fn spawn_detached(&self, launcher: &Path, cwd: &Path) -> std::io::Result<u32> {
        let child = Command::new(LAUNCHER_SHELL)
            .arg(launcher)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            // Own group: Ctrl-C on the panel does not reach managed apps
            .process_group(0)
            .kill_on_drop(false)
            .spawn()?;

        // Dropping the handle hands the child to tokio's orphan reaper, so it
        // does not linger as a zombie once it exits.
        child
            .id()
            .ok_or_else(|| std::io::Error::other("spawned process exited before reporting a PID"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn current_process_is_alive() {
        let host = UnixHost::new();
        assert_eq!(host.is_alive(std::process::id()).await, Liveness::Alive);
    }

    #[tokio::test]
    async fn pid_zero_is_unconfirmed() {
        let host = UnixHost::new();
        assert!(matches!(host.is_alive(0).await, Liveness::Unconfirmed(_)));
    }

    #[test]
    fn permission_denied_is_unconfirmed() {
        assert_eq!(
            liveness_from(Err(Errno::EPERM), || false),
            Liveness::Unconfirmed("permission denied".to_string())
        );
        assert_eq!(liveness_from(Err(Errno::ESRCH), || false), Liveness::Gone);
        assert_eq!(liveness_from(Ok(()), || true), Liveness::Gone);
        assert_eq!(liveness_from(Ok(()), || false), Liveness::Alive);
    }

    #[tokio::test]
    async fn foreign_process_is_not_alive_when_unprivileged() {
        // Only meaningful when kill(1, 0) is denied
        if nix::unistd::geteuid().is_root() {
            return;
        }
        let host = UnixHost::new();
        assert!(matches!(host.is_alive(1).await, Liveness::Unconfirmed(_)));
    }

    #[tokio::test]
    async fn refuses_to_terminate_init() {
        let host = UnixHost::new();
        assert!(matches!(
            host.terminate(1).await,
            Err(TerminateError::Failed(_))
        ));
    }

    // Relies on the /proc zombie check, since nothing reaps the killed child
    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn spawn_then_terminate() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = dir.path().join("run.sh");
        std::fs::write(&launcher, "sleep 30\n").unwrap();

        let host = UnixHost::new();
        let pid = host.spawn_detached(&launcher, dir.path()).await.unwrap();
        assert_eq!(host.is_alive(pid).await, Liveness::Alive);

        host.terminate(pid).await.unwrap();

        let mut liveness = host.is_alive(pid).await;
        for _ in 0..50 {
            if liveness == Liveness::Gone {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            liveness = host.is_alive(pid).await;
        }
        assert_eq!(liveness, Liveness::Gone);
    }
}
