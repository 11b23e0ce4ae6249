use super::{parse_duration_string, PanelConfig};
use crate::error::{Error, Result};
use std::net::SocketAddr;
use std::time::Duration;

impl PanelConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.listen.parse::<SocketAddr>().map_err(|e| {
            Error::Config(format!("listen address '{}' is invalid: {}", self.listen, e))
        })?;

        if self.secret_path.is_empty() {
            return Err(Error::Config("secret_path must not be empty".to_string()));
        }
        if let Some(bad) = self
            .secret_path
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(Error::Config(format!(
                "secret_path '{}' contains '{}'. Use letters, digits, '-' and '_' only",
                self.secret_path, bad
            )));
        }

        if self.launcher_extensions.is_empty()
            || self
                .launcher_extensions
                .iter()
                .any(|ext| ext.trim_start_matches('.').is_empty())
        {
            return Err(Error::Config(
                "launcher_extensions needs at least one non-empty extension".to_string(),
            ));
        }

        for file in [&self.registry_file, &self.process_file] {
            if file.trim().is_empty() {
                return Err(Error::Config("data file names must not be empty".to_string()));
            }
        }
        if self.registry_file == self.process_file {
            return Err(Error::Config(format!(
                "registry_file and process_file are both '{}'",
                self.registry_file
            )));
        }

        for (field, value) in [
            ("query_timeout", &self.query_timeout),
            ("terminate_timeout", &self.terminate_timeout),
        ] {
            match parse_duration_string(value) {
                None => {
                    return Err(Error::Config(format!(
                        "{} '{}' is invalid. Use formats like '5s', '30s', '1m', '500ms'",
                        field, value
                    )))
                }
                Some(Duration::ZERO) => {
                    return Err(Error::Config(format!("{} must be greater than zero", field)))
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}
