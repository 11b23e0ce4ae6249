use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// A managed application: one launcher plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    /// Absolute path to the launcher script
    pub path: PathBuf,

    /// Working directory for the launcher (parent of `path` at registration)
    pub cwd: PathBuf,

    /// Declared port. Informational only, never checked against real usage.
    #[serde(default)]
    pub port: Option<u16>,
}

impl AppRecord {
    /// Build a record, deriving the working directory from the launcher path.
    pub fn new(path: PathBuf, port: Option<u16>) -> Self {
        let cwd = working_dir_for(&path);
        Self { path, cwd, port }
    }

    /// Lenient parse of a stored record.
    ///
    /// Requires an object with a string `path`. A missing `cwd` is derived
    /// from the path; a port that is neither an integer nor a numeric string
    /// (or is out of range) becomes `None`.
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let path = PathBuf::from(object.get("path")?.as_str()?);

        let cwd = object
            .get("cwd")
            .and_then(Value::as_str)
            .map(PathBuf::from)
            .unwrap_or_else(|| working_dir_for(&path));

        let port = match object.get("port") {
            Some(Value::Number(n)) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
            Some(Value::String(s)) => s.trim().parse::<u16>().ok(),
            _ => None,
        };

        Some(Self { path, cwd, port })
    }
}

fn working_dir_for(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| path.to_path_buf())
}

/// The current registry schema: records plus display order, in agreement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRegistry {
    pub apps: BTreeMap<String, AppRecord>,
    pub order: Vec<String>,
}

impl CanonicalRegistry {
    /// True when `order` names every app exactly once and nothing else.
    pub fn is_consistent(&self) -> bool {
        order_matches(&self.order, self.apps.keys().map(String::as_str))
    }

    /// Records in display order.
    pub fn ordered(&self) -> impl Iterator<Item = (&str, &AppRecord)> {
        self.order
            .iter()
            .filter_map(|name| self.apps.get(name).map(|app| (name.as_str(), app)))
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

/// Set equality between an order and a collection of names, with no
/// duplicates allowed in the order.
pub(crate) fn order_matches<'a>(
    order: &[String],
    names: impl IntoIterator<Item = &'a str>,
) -> bool {
    let mut seen = HashSet::with_capacity(order.len());
    if !order.iter().all(|name| seen.insert(name.as_str())) {
        return false;
    }
    let names: HashSet<&str> = names.into_iter().collect();
    seen == names
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_derives_working_dir() {
        let record = AppRecord::new(PathBuf::from("/abs/launch.bat"), Some(8080));
        assert_eq!(record.cwd, PathBuf::from("/abs"));
        assert_eq!(record.port, Some(8080));
    }

    #[test]
    fn from_value_accepts_string_port_and_missing_cwd() {
        let record = AppRecord::from_value(&json!({"path": "/srv/app/run.sh", "port": " 3000 "}))
            .expect("record");
        assert_eq!(record.cwd, PathBuf::from("/srv/app"));
        assert_eq!(record.port, Some(3000));
    }

    #[test]
    fn from_value_discards_unusable_port() {
        let record =
            AppRecord::from_value(&json!({"path": "/a/b.sh", "cwd": "/a", "port": 70000})).unwrap();
        assert_eq!(record.port, None);

        let record =
            AppRecord::from_value(&json!({"path": "/a/b.sh", "cwd": "/a", "port": true})).unwrap();
        assert_eq!(record.port, None);
    }

    #[test]
    fn from_value_requires_path() {
        assert!(AppRecord::from_value(&json!({"cwd": "/a"})).is_none());
        assert!(AppRecord::from_value(&json!({"path": 12})).is_none());
        assert!(AppRecord::from_value(&json!("/a/b.sh")).is_none());
    }

    #[test]
    fn order_matching_rejects_duplicates_and_strangers() {
        let names = ["a", "b"];
        assert!(order_matches(&["b".into(), "a".into()], names));
        assert!(!order_matches(&["a".into(), "a".into(), "b".into()], names));
        assert!(!order_matches(&["a".into()], names));
        assert!(!order_matches(&["a".into(), "b".into(), "c".into()], names));
        assert!(order_matches(&[], []));
    }

    #[test]
    fn ordered_follows_display_order() {
        let mut registry = CanonicalRegistry::default();
        registry
            .apps
            .insert("a".into(), AppRecord::new("/x/a.sh".into(), None));
        registry
            .apps
            .insert("b".into(), AppRecord::new("/x/b.sh".into(), None));
        registry.order = vec!["b".into(), "a".into()];

        let names: Vec<&str> = registry.ordered().map(|(name, _)| name).collect();
        assert_eq!(names, ["b", "a"]);
        assert!(registry.is_consistent());
    }
}
