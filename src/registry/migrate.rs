//! Registry schema migration.
//!
//! Three shapes of registry file exist in the wild:
//!
//! | Shape | Example | Action |
//! |---|---|---|
//! | legacy (bare mapping, or anything that is not a mapping) | `{"web": {...}}` | wrap into `apps`, order = keys |
//! | unordered | `{"apps": {...}}` | order = keys |
//! | current | `{"apps": {...}, "order": [...]}` | rebuild order if it disagrees with `apps` |
//!
//! [`migrate`] is total: every JSON value maps to a [`CanonicalRegistry`].
//! Running it on its own output is a no-op.

use super::types::{order_matches, AppRecord, CanonicalRegistry};
use serde_json::{Map, Value};

/// A registry file classified by schema generation.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredRegistry {
    /// Root is not a mapping (missing file, corrupt file, array, ...)
    Unrecognized,
    /// Bare `name -> record` mapping from before display ordering existed
    Legacy(Map<String, Value>),
    /// `{"apps": ...}` with no order
    Unordered { apps: Map<String, Value> },
    /// `{"apps": ..., "order": ...}`
    Current {
        apps: Map<String, Value>,
        order: Value,
    },
}

impl StoredRegistry {
    pub fn classify(raw: Value) -> Self {
        let Value::Object(mut root) = raw else {
            return StoredRegistry::Unrecognized;
        };

        let Some(apps) = root.remove("apps") else {
            return StoredRegistry::Legacy(root);
        };

        let Value::Object(apps) = apps else {
            // Without usable apps any stored order is meaningless
            tracing::warn!("Registry 'apps' is not a mapping, treating as empty");
            return StoredRegistry::Unordered { apps: Map::new() };
        };

        match root.remove("order") {
            Some(order) => StoredRegistry::Current { apps, order },
            None => StoredRegistry::Unordered { apps },
        }
    }
}

/// What migration had to do to reach the canonical shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationAction {
    /// Already canonical
    None,
    /// Legacy or unrecognized root wrapped into `apps` + `order`
    WrappedLegacy,
    /// `order` was absent and was synthesized from the app keys
    SynthesizedOrder,
    /// `order` disagreed with `apps` and was rebuilt from the app keys
    RebuiltOrder,
    /// Order was fine but some records were dropped or rewritten
    NormalizedRecords,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Migrated {
    pub registry: CanonicalRegistry,
    pub action: MigrationAction,
}

impl Migrated {
    /// Every action except `None` must be written back before use.
    pub fn needs_persist(&self) -> bool {
        self.action != MigrationAction::None
    }
}

/// Upgrade any stored registry value to the canonical schema.
pub fn migrate(raw: Value) -> Migrated {
    match StoredRegistry::classify(raw) {
        StoredRegistry::Unrecognized => Migrated {
            registry: CanonicalRegistry::default(),
            action: MigrationAction::WrappedLegacy,
        },
        StoredRegistry::Legacy(apps) => {
            let (registry, _) = from_key_order(&apps);
            Migrated {
                registry,
                action: MigrationAction::WrappedLegacy,
            }
        }
        StoredRegistry::Unordered { apps } => {
            let (registry, _) = from_key_order(&apps);
            Migrated {
                registry,
                action: MigrationAction::SynthesizedOrder,
            }
        }
        StoredRegistry::Current { apps, order } => {
            let (mut registry, normalized) = from_key_order(&apps);
            let stored_order = string_list(&order);

            match stored_order {
                Some(order)
                    if order_matches(&order, registry.apps.keys().map(String::as_str)) =>
                {
                    registry.order = order;
                    let action = if normalized {
                        MigrationAction::NormalizedRecords
                    } else {
                        MigrationAction::None
                    };
                    Migrated { registry, action }
                }
                _ => Migrated {
                    registry,
                    action: MigrationAction::RebuiltOrder,
                },
            }
        }
    }
}

/// Parse records and take their key order as display order.
///
/// Returns `true` alongside the registry when any record had to be dropped
/// or rewritten.
fn from_key_order(apps: &Map<String, Value>) -> (CanonicalRegistry, bool) {
    let mut registry = CanonicalRegistry::default();
    let mut normalized = false;

    for (name, value) in apps {
        match AppRecord::from_value(value) {
            Some(record) => {
                if serde_json::to_value(&record).ok().as_ref() != Some(value) {
                    normalized = true;
                }
                registry.order.push(name.clone());
                registry.apps.insert(name.clone(), record);
            }
            None => {
                tracing::warn!("Dropping registry entry '{}': no usable launcher path", name);
                normalized = true;
            }
        }
    }

    (registry, normalized)
}

/// `Some` only when the value is an array made entirely of strings.
fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}
