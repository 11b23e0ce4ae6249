use super::parse_duration_string;
use crate::registry::LauncherPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:9999";
pub const DEFAULT_SECRET_PATH: &str = "remote-admin-xxxx";
pub const DEFAULT_QUERY_TIMEOUT: &str = "5s";
pub const DEFAULT_TERMINATE_TIMEOUT: &str = "10s";

/// Panel settings, read from `remote-starter.yaml`.
///
/// Every field has a default, so an empty file (or no file) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Socket address the HTTP server binds to
    pub listen: String,

    /// URL segment that prefixes every mutating route
    pub secret_path: String,

    /// Directory holding the registry and process table files
    pub data_dir: PathBuf,

    pub registry_file: String,

    pub process_file: String,

    /// Extensions accepted for launchers, without the dot
    pub launcher_extensions: Vec<String>,

    /// Bound on one liveness query (e.g., "500ms", "5s")
    pub query_timeout: String,

    /// Bound on one termination request
    pub terminate_timeout: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            secret_path: DEFAULT_SECRET_PATH.to_string(),
            data_dir: PathBuf::from("."),
            registry_file: "config.json".to_string(),
            process_file: "processes.json".to_string(),
            launcher_extensions: LauncherPolicy::default().extensions,
            query_timeout: DEFAULT_QUERY_TIMEOUT.to_string(),
            terminate_timeout: DEFAULT_TERMINATE_TIMEOUT.to_string(),
        }
    }
}

impl PanelConfig {
    /// Config rooted at `data_dir`, everything else default.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn registry_path(&self) -> PathBuf {
        self.data_dir.join(&self.registry_file)
    }

    pub fn process_path(&self) -> PathBuf {
        self.data_dir.join(&self.process_file)
    }

    pub fn launcher_policy(&self) -> LauncherPolicy {
        LauncherPolicy::new(self.launcher_extensions.iter().cloned())
    }

    /// Parsed `query_timeout`, falling back to the default if unparseable.
    ///
    /// `validate()` rejects unparseable values, so the fallback only
    /// applies to configs built in code without validation.
    pub fn query_timeout(&self) -> Duration {
        parse_duration_string(&self.query_timeout).unwrap_or(Duration::from_secs(5))
    }

    pub fn terminate_timeout(&self) -> Duration {
        parse_duration_string(&self.terminate_timeout).unwrap_or(Duration::from_secs(10))
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_path == DEFAULT_SECRET_PATH
    }
}
