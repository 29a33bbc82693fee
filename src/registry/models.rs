// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};

fn visible_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Unique identifier, also used as the render key
    pub name: String,

    /// Demo kind, looked up in the demo catalog when mounting
    #[serde(rename = "type")]
    pub kind: String,

    /// Free-text description shown in the toggle panel
    #[serde(default)]
    pub description: String,

    #[serde(rename = "isVisible", default = "visible_by_default")]
    pub is_visible: bool,
}

impl RegistryEntry {
    pub fn new(name: &str, kind: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            description: description.to_string(),
            is_visible: true,
        }
    }
}

/// Load state of a registry instance. Writes to the store are only
/// permitted once the registry is `Ready`; `Failed` means the stored list
/// could not be read and must not be overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPhase {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_entry_new() {
        let entry = RegistryEntry::new("Counter Comp", "Comp1", "Master useState");

        assert_eq!(entry.name, "Counter Comp");
        assert_eq!(entry.kind, "Comp1");
        assert_eq!(entry.description, "Master useState");
        assert!(entry.is_visible);
    }

    #[test]
    fn test_registry_entry_serialize_json() {
        let mut entry = RegistryEntry::new("Display", "Greetings", "Learn how to pass props");
        entry.is_visible = false;

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"name\":\"Display\""));
        assert!(json.contains("\"type\":\"Greetings\""));
        assert!(json.contains("\"description\":\"Learn how to pass props\""));
        assert!(json.contains("\"isVisible\":false"));
    }

    #[test]
    fn test_registry_entry_deserialize_defaults() {
        let json = r#"{ "name": "FetchAPI", "type": "FetchAPI" }"#;

        let entry: RegistryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.name, "FetchAPI");
        assert_eq!(entry.kind, "FetchAPI");
        assert_eq!(entry.description, "");
        assert!(entry.is_visible);
    }

    #[test]
    fn test_registry_entry_requires_shape() {
        assert!(serde_json::from_str::<RegistryEntry>(r#"{ "name": "x" }"#).is_err());
        assert!(serde_json::from_str::<RegistryEntry>(r#"{ "name": "x", "type": 7 }"#).is_err());
        assert!(serde_json::from_str::<Vec<RegistryEntry>>("{}").is_err());
    }
}
