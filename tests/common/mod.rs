#![allow(dead_code)]

//! Shared fixtures for integration tests: an in-memory process host and a
//! panel rooted in a temp directory.

use async_trait::async_trait;
use parking_lot::Mutex;
use remote_starter::config::PanelConfig;
use remote_starter::process::{Liveness, ProcessHost, TerminateError};
use remote_starter::ControlPanel;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

#[derive(Default)]
struct FakeState {
    next_pid: u32,
    alive: BTreeSet<u32>,
    spawned: Vec<(PathBuf, PathBuf)>,
    terminated: Vec<u32>,
    liveness_failure: Option<String>,
    terminate_failure: Option<String>,
    spawn_failure: Option<String>,
    hang_queries: bool,
    hang_terminations: bool,
}

/// Process host that simulates processes as a set of live PIDs.
pub struct FakeHost {
    state: Mutex<FakeState>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState {
                next_pid: 1000,
                ..FakeState::default()
            }),
        })
    }

    pub fn spawn_count(&self) -> usize {
        self.state.lock().spawned.len()
    }

    /// (launcher, cwd) of every spawn so far
    pub fn spawned(&self) -> Vec<(PathBuf, PathBuf)> {
        self.state.lock().spawned.clone()
    }

    pub fn terminated(&self) -> Vec<u32> {
        self.state.lock().terminated.clone()
    }

    pub fn is_running(&self, pid: u32) -> bool {
        self.state.lock().alive.contains(&pid)
    }

    /// Pretend a process exists (e.g., left over from a previous run).
    pub fn add_live_process(&self, pid: u32) {
        self.state.lock().alive.insert(pid);
    }

    /// The process exits without the panel's involvement.
    pub fn kill_externally(&self, pid: u32) {
        self.state.lock().alive.remove(&pid);
    }

    pub fn fail_liveness_queries(&self, reason: &str) {
        self.state.lock().liveness_failure = Some(reason.to_string());
    }

    pub fn fail_terminations(&self, reason: &str) {
        self.state.lock().terminate_failure = Some(reason.to_string());
    }

    pub fn fail_spawns(&self, reason: &str) {
        self.state.lock().spawn_failure = Some(reason.to_string());
    }

    pub fn hang_queries(&self) {
        self.state.lock().hang_queries = true;
    }

    pub fn hang_terminations(&self) {
        self.state.lock().hang_terminations = true;
    }
}

#[async_trait]
impl ProcessHost for FakeHost {
    async fn is_alive(&self, pid: u32) -> Liveness {
        let answer = {
            let state = self.state.lock();
            if state.hang_queries {
                None
            } else if let Some(ref reason) = state.liveness_failure {
                Some(Liveness::Unconfirmed(reason.clone()))
            } else if state.alive.contains(&pid) {
                Some(Liveness::Alive)
            } else {
                Some(Liveness::Gone)
            }
        };
        match answer {
            Some(liveness) => liveness,
            None => std::future::pending().await,
        }
    }

    async fn terminate(&self, pid: u32) -> Result<(), TerminateError> {
        let answer = {
            let mut state = self.state.lock();
            if state.hang_terminations {
                None
            } else if let Some(ref reason) = state.terminate_failure {
                Some(Err(TerminateError::Failed(reason.clone())))
            } else {
                state.terminated.push(pid);
                if state.alive.remove(&pid) {
                    Some(Ok(()))
                } else {
                    Some(Err(TerminateError::NotFound))
                }
            }
        };
        match answer {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }

    async fn spawn_detached(&self, launcher: &Path, cwd: &Path) -> std::io::Result<u32> {
        let mut state = self.state.lock();
        if let Some(ref reason) = state.spawn_failure {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                reason.clone(),
            ));
        }
        state.next_pid += 1;
        let pid = state.next_pid;
        state.alive.insert(pid);
        state.spawned.push((launcher.to_path_buf(), cwd.to_path_buf()));
        Ok(pid)
    }
}

/// A data directory, a fake host and helpers to open panels over them.
pub struct Fixture {
    pub dir: TempDir,
    pub host: Arc<FakeHost>,
    pub config: PanelConfig,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = PanelConfig {
            launcher_extensions: vec!["bat".to_string()],
            ..PanelConfig::in_dir(dir.path())
        };
        Self {
            dir,
            host: FakeHost::new(),
            config,
        }
    }

    pub fn open(&self) -> ControlPanel {
        let host: Arc<dyn ProcessHost> = self.host.clone();
        ControlPanel::open(&self.config, host)
    }

    /// Create a launcher file under `<dir>/<app_dir>/launch.bat`.
    pub fn launcher(&self, app_dir: &str) -> String {
        let dir = self.dir.path().join(app_dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("launch.bat");
        std::fs::write(&path, "@echo off\r\n").unwrap();
        path.to_string_lossy().into_owned()
    }

    pub fn registry_json(&self) -> serde_json::Value {
        read_json(&self.config.registry_path())
    }

    pub fn processes_json(&self) -> serde_json::Value {
        read_json(&self.config.process_path())
    }

    pub fn write_registry(&self, value: serde_json::Value) {
        std::fs::write(self.config.registry_path(), value.to_string()).unwrap();
    }

    pub fn write_processes(&self, value: serde_json::Value) {
        std::fs::write(self.config.process_path(), value.to_string()).unwrap();
    }

    /// Make every save of `file` fail by occupying its `.tmp` sibling with a
    /// directory.
    pub fn block_writes(&self, file: &Path) {
        std::fs::create_dir(temp_sibling(file)).unwrap();
    }

    pub fn unblock_writes(&self, file: &Path) {
        std::fs::remove_dir(temp_sibling(file)).unwrap();
    }
}

fn temp_sibling(file: &Path) -> PathBuf {
    let mut name = file.file_name().unwrap().to_os_string();
    name.push(".tmp");
    file.with_file_name(name)
}

fn read_json(path: &Path) -> serde_json::Value {
    match std::fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw).unwrap(),
        Err(_) => serde_json::Value::Null,
    }
}
