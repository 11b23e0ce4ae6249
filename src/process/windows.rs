use super::tasklist::lists_pid;
use super::{Liveness, ProcessHost, TerminateError};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// `CREATE_NEW_CONSOLE`: the launcher gets its own console window and
/// outlives the panel.
const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;

/// Process host backed by `tasklist` / `taskkill` / `cmd.exe`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsHost;

impl WindowsHost {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessHost for WindowsHost {
    async fn is_alive(&self, pid: u32) -> Liveness {
        let output = Command::new("tasklist")
            .args(["/FI", &format!("PID eq {}", pid), "/FO", "CSV", "/NH"])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                if lists_pid(&String::from_utf8_lossy(&output.stdout), pid) {
                    Liveness::Alive
                } else {
                    Liveness::Gone
                }
            }
            Ok(output) => Liveness::Unconfirmed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ),
            Err(e) => Liveness::Unconfirmed(e.to_string()),
        }
    }

    async fn terminate(&self, pid: u32) -> Result<(), TerminateError> {
        let output = Command::new("taskkill")
            .args(["/F", "/T", "/PID", &pid.to_string()])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| TerminateError::Failed(e.to_string()))?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.to_lowercase().contains("not found") {
            Err(TerminateError::NotFound)
        } else {
            Err(TerminateError::Failed(stderr))
        }
    }

    async fn spawn_detached(&self, launcher: &Path, cwd: &Path) -> std::io::Result<u32> {
        let child = Command::new("cmd.exe")
            .arg("/k")
            .arg(launcher)
            .current_dir(cwd)
            .creation_flags(CREATE_NEW_CONSOLE)
            .kill_on_drop(false)
            .spawn()?;

        child
            .id()
            .ok_or_else(|| std::io::Error::other("spawned process exited before reporting a PID"))
    }
}
