// SPDX-License-Identifier: GPL-3.0-only
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::store::KeyValueStore;

pub fn widget_key(id: &str) -> String {
    format!("widget-state-{}", id)
}

/// Shared on/off state for a group of widgets with reset-all.
///
/// Handed explicitly to whoever renders the widget group. Each widget is
/// persisted under its own key. The initial states are read in
/// [`open`](Self::open), so no write can happen before loading completes.
pub struct WidgetStore {
    store: Arc<dyn KeyValueStore>,
    widgets: Mutex<BTreeMap<String, bool>>,
}

impl WidgetStore {
    /// Load widgets `1..=count`; missing or unreadable entries start off
    pub async fn open(store: Arc<dyn KeyValueStore>, count: u32) -> Self {
        let mut widgets = BTreeMap::new();
        for id in 1..=count {
            let id = id.to_string();
            let state = match store.get::<bool>(&widget_key(&id)).await {
                Ok(state) => state.unwrap_or(false),
                Err(e) => {
                    error!(error = %e, widget = %id, "Failed to read widget state");
                    false
                }
            };
            widgets.insert(id, state);
        }

        info!(count = widgets.len(), "Loaded widget states");
        Self {
            store,
            widgets: Mutex::new(widgets),
        }
    }

    pub async fn get(&self, id: &str) -> Option<bool> {
        self.widgets.lock().await.get(id).copied()
    }

    pub async fn all(&self) -> BTreeMap<String, bool> {
        self.widgets.lock().await.clone()
    }

    /// Flip a widget; an unknown id starts from off
    pub async fn toggle(&self, id: &str) -> bool {
        let mut widgets = self.widgets.lock().await;
        let state = !widgets.get(id).copied().unwrap_or(false);
        widgets.insert(id.to_string(), state);
        self.persist(id, state).await;
        state
    }

    pub async fn set(&self, id: &str, state: bool) {
        let mut widgets = self.widgets.lock().await;
        widgets.insert(id.to_string(), state);
        self.persist(id, state).await;
    }

    /// Add a widget with `default` unless it already has a state
    pub async fn register(&self, id: &str, default: bool) -> bool {
        let mut widgets = self.widgets.lock().await;
        if let Some(existing) = widgets.get(id) {
            return *existing;
        }
        widgets.insert(id.to_string(), default);
        self.persist(id, default).await;
        default
    }

    pub async fn reset(&self, id: &str) {
        self.set(id, false).await;
    }

    /// Turn every known widget off
    pub async fn reset_all(&self) {
        let mut widgets = self.widgets.lock().await;
        for (id, state) in widgets.iter_mut() {
            *state = false;
            self.persist(id, false).await;
        }
        info!(count = widgets.len(), "Reset all widgets");
    }

    async fn persist(&self, id: &str, state: bool) {
        if let Err(e) = self.store.set(&widget_key(id), &state).await {
            error!(error = %e, widget = %id, "Failed to persist widget state");
        }
    }
}
