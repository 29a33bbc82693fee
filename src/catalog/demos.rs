// SPDX-License-Identifier: GPL-3.0-only
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::warn;

use crate::registry::RegistryEntry;

/// One visible demo as handed to the front end
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MountedDemo {
    /// Render key, the entry's unique name
    pub key: String,
    pub kind: String,
    pub props: Value,
    /// Shared state the demo has to be wrapped in, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<&'static str>,
}

pub type DemoFactory = fn(&RegistryEntry) -> MountedDemo;

fn plain(entry: &RegistryEntry) -> MountedDemo {
    MountedDemo {
        key: entry.name.clone(),
        kind: entry.kind.clone(),
        props: json!({}),
        provider: None,
    }
}

fn greetings(entry: &RegistryEntry) -> MountedDemo {
    MountedDemo {
        props: json!({ "name": "Iguana" }),
        ..plain(entry)
    }
}

fn widget_group(entry: &RegistryEntry) -> MountedDemo {
    MountedDemo {
        provider: Some("widgets"),
        ..plain(entry)
    }
}

/// Maps a demo kind to the factory that mounts it
pub struct DemoCatalog {
    factories: HashMap<String, DemoFactory>,
}

impl DemoCatalog {
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Every demo kind the sandbox ships with
    pub fn standard() -> Self {
        let mut catalog = Self::empty();
        for kind in [
            "First",
            "Comp1",
            "UseEffect",
            "UseRefComponent",
            "FetchAPI",
            "OptimizedFetchAPI",
        ] {
            catalog.register(kind, plain);
        }
        catalog.register("Greetings", greetings);
        catalog.register("Assignment1", widget_group);
        catalog
    }

    pub fn register(&mut self, kind: &str, factory: DemoFactory) {
        self.factories.insert(kind.to_string(), factory);
    }

    /// Mount the visible entries in order. Entries whose kind has no
    /// factory are logged and skipped.
    pub fn mount(&self, entries: &[RegistryEntry]) -> Vec<MountedDemo> {
        entries
            .iter()
            .filter(|entry| entry.is_visible)
            .filter_map(|entry| match self.factories.get(&entry.kind) {
                Some(factory) => Some(factory(entry)),
                None => {
                    warn!(name = %entry.name, kind = %entry.kind, "No demo registered for kind, skipping");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_visible_in_order() {
        let mut hidden = RegistryEntry::new("Counter Comp", "Comp1", "");
        hidden.is_visible = false;
        let entries = vec![
            RegistryEntry::new("FetchAPI", "FetchAPI", ""),
            hidden,
            RegistryEntry::new("First comp", "First", ""),
        ];

        let mounted = DemoCatalog::standard().mount(&entries);
        let keys: Vec<&str> = mounted.iter().map(|demo| demo.key.as_str()).collect();
        assert_eq!(keys, vec!["FetchAPI", "First comp"]);
    }

    #[test]
    fn test_mount_special_cases() {
        let entries = vec![
            RegistryEntry::new("Display", "Greetings", ""),
            RegistryEntry::new("Assignment1", "Assignment1", ""),
        ];

        let mounted = DemoCatalog::standard().mount(&entries);
        assert_eq!(mounted[0].props, json!({ "name": "Iguana" }));
        assert_eq!(mounted[0].provider, None);
        assert_eq!(mounted[1].provider, Some("widgets"));
    }

    #[test]
    fn test_mount_skips_unknown_kind() {
        let entries = vec![
            RegistryEntry::new("Ghost", "DoesNotExist", ""),
            RegistryEntry::new("First comp", "First", ""),
        ];

        let mounted = DemoCatalog::standard().mount(&entries);
        assert_eq!(mounted.len(), 1);
        assert_eq!(mounted[0].kind, "First");
    }

    #[test]
    fn test_register_custom_factory() {
        let mut catalog = DemoCatalog::empty();
        catalog.register("Custom", plain);
        assert!(catalog.mount(&[RegistryEntry::new("First comp", "First", "")]).is_empty());
        assert_eq!(catalog.mount(&[RegistryEntry::new("c", "Custom", "")]).len(), 1);
    }
}
