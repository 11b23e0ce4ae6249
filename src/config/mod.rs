//! Panel configuration.
//!
//! - `types` - `PanelConfig` and its defaults
//! - `duration` - timeout strings like "5s" or "500ms"
//! - `parser` - YAML loading and config file lookup
//! - `validation` - `PanelConfig::validate`

mod duration;
mod parser;
mod types;
mod validation;

pub use duration::*;
pub use parser::*;
pub use types::*;
