use super::PanelConfig;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "remote-starter.yaml";

pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    /// Load the panel config.
    ///
    /// An explicit path must exist. Without one, `remote-starter.yaml` in
    /// the current directory is used if present, otherwise all defaults.
    pub fn load(&self, explicit: Option<&Path>) -> Result<PanelConfig> {
        match explicit {
            Some(path) => self.load_config(path),
            None => {
                let current_dir = std::env::current_dir()?;
                match Self::find_config_in_dir(&current_dir) {
                    Some(path) => self.load_config(path),
                    None => {
                        tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                        Ok(PanelConfig::default())
                    }
                }
            }
        }
    }

    pub fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        // Try alternate name
        let alt_path = dir.join("remote-starter.yml");
        alt_path.exists().then_some(alt_path)
    }

    /// Load config from file path
    pub fn load_config<P: AsRef<Path>>(&self, path: P) -> Result<PanelConfig> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        tracing::debug!("Loaded config from {}", path.as_ref().display());
        self.parse_config(&content)
    }

    /// Parse config from YAML string. Blank input yields the defaults.
    pub fn parse_config(&self, content: &str) -> Result<PanelConfig> {
        if content.trim().is_empty() {
            return Ok(PanelConfig::default());
        }

        serde_yaml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse YAML config: {}", e)))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parse_partial_config() {
        let yaml = r#"
listen: 127.0.0.1:8088
secret_path: my-panel
query_timeout: 500ms
launcher_extensions: [bat]
"#;

        let config = Parser::new().parse_config(yaml).unwrap();
        assert_eq!(config.listen, "127.0.0.1:8088");
        assert_eq!(config.secret_path, "my-panel");
        assert_eq!(config.query_timeout(), Duration::from_millis(500));
        assert_eq!(config.terminate_timeout(), Duration::from_secs(10));
        assert_eq!(config.launcher_extensions, ["bat"]);
        assert_eq!(config.registry_file, "config.json");
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = Parser::new().parse_config("\n").unwrap();
        assert_eq!(config, PanelConfig::default());
    }

    #[test]
    fn test_unknown_type_is_config_error() {
        let err = Parser::new()
            .parse_config("launcher_extensions: 5")
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Parser::new()
            .load(Some(&dir.path().join("nope.yaml")))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_find_config_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Parser::find_config_in_dir(dir.path()), None);

        let alt = dir.path().join("remote-starter.yml");
        fs::write(&alt, "listen: 0.0.0.0:1234\n").unwrap();
        assert_eq!(Parser::find_config_in_dir(dir.path()), Some(alt.clone()));

        let config = Parser::new().load(Some(&alt)).unwrap();
        assert_eq!(config.listen, "0.0.0.0:1234");
    }
}
