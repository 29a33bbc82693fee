// SPDX-License-Identifier: GPL-3.0-only
use serde::Serialize;

use crate::registry::ComponentRegistry;

/// One checkbox row of the visibility panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelRow {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub checked: bool,
}

/// Visibility panel over the registry.
///
/// Only the open flag lives here and it is never persisted. Every row and
/// toggle goes straight through [`ComponentRegistry`].
#[derive(Debug, Default, Clone)]
pub struct TogglePanel {
    open: bool,
}

impl TogglePanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle_open(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    pub async fn rows(&self, registry: &ComponentRegistry) -> Vec<PanelRow> {
        registry
            .list()
            .await
            .into_iter()
            .map(|entry| PanelRow {
                description: Some(entry.description).filter(|d| !d.is_empty()),
                checked: entry.is_visible,
                name: entry.name,
            })
            .collect()
    }

    pub async fn toggle(&self, registry: &ComponentRegistry, name: &str) -> Option<bool> {
        registry.toggle_visibility(name).await
    }
}
