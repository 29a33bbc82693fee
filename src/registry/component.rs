// SPDX-License-Identifier: GPL-3.0-only
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::registry::models::{LoadPhase, RegistryEntry};
use crate::store::{KeyValueStore, StoreError};

/// Storage key holding the ordered component list
pub const REGISTRY_KEY: &str = "comps";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("'type' must be a string, got: {0}")]
    InvalidKind(String),
}

/// Boundary check for registrations arriving as untyped JSON
pub fn validate_kind(kind: &Value) -> Result<&str, RegistryError> {
    kind.as_str()
        .ok_or_else(|| RegistryError::InvalidKind(kind.to_string()))
}

struct RegistryState {
    phase: LoadPhase,
    entries: Vec<RegistryEntry>,
}

/// Ordered, name-keyed collection of demo entries mirrored to the store.
///
/// All mutations take the state lock and work on the latest list, so
/// concurrent toggles never lose updates. Persistence happens inside the same
/// critical section, which keeps store writes in mutation order.
pub struct ComponentRegistry {
    store: Arc<dyn KeyValueStore>,
    state: Mutex<RegistryState>,
}

impl ComponentRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            state: Mutex::new(RegistryState {
                phase: LoadPhase::Uninitialized,
                entries: Vec::new(),
            }),
        }
    }

    pub async fn phase(&self) -> LoadPhase {
        self.state.lock().await.phase
    }

    /// Load the persisted list. Once a load succeeds, later calls do
    /// nothing.
    ///
    /// A malformed stored value is logged, removed from the store, and the
    /// registry starts empty. Nothing is written back here; the first
    /// mutation after this returns persists the list. When the store cannot
    /// be read the registry ends up `Failed`: mutations stay in memory and
    /// the stored list is left alone until a later `load` succeeds.
    pub async fn load(&self) -> Vec<RegistryEntry> {
        let mut state = self.state.lock().await;
        if !matches!(state.phase, LoadPhase::Uninitialized | LoadPhase::Failed) {
            return state.entries.clone();
        }
        state.phase = LoadPhase::Loading;

        match self.store.get::<Vec<RegistryEntry>>(REGISTRY_KEY).await {
            Ok(Some(entries)) => {
                info!(count = entries.len(), "Loaded components from store");
                state.entries = entries;
            }
            Ok(None) => {
                debug!("No persisted component list");
            }
            Err(e @ StoreError::Deserialization { .. }) => {
                error!(error = %e, "Failed to load components, discarding stored value");
                if let Err(e) = self.store.remove(REGISTRY_KEY).await {
                    error!(error = %e, "Failed to clear malformed component list");
                }
                state.entries.clear();
            }
            Err(e) => {
                error!(error = %e, "Component store unavailable, keeping writes in memory");
                state.phase = LoadPhase::Failed;
                return state.entries.clone();
            }
        }

        state.phase = LoadPhase::Ready;
        state.entries.clone()
    }

    /// Append a visible entry unless `name` is already registered.
    ///
    /// Returns whether a new entry was added. Existing entries are never
    /// reordered or modified; the first registration of a name wins.
    pub async fn register(&self, name: &str, kind: &str, description: &str) -> bool {
        let mut state = self.state.lock().await;
        if state.entries.iter().any(|entry| entry.name == name) {
            debug!(name, "Component already registered");
            return false;
        }

        state.entries.push(RegistryEntry::new(name, kind, description));
        info!(name, kind, "Registered component");
        self.persist(&state).await;
        true
    }

    /// Same as [`register`](Self::register) for a `type` that has not been
    /// checked yet. Non-string kinds are logged and rejected untouched.
    pub async fn register_value(
        &self,
        name: &str,
        kind: &Value,
        description: &str,
    ) -> Result<bool, RegistryError> {
        match validate_kind(kind) {
            Ok(kind) => Ok(self.register(name, kind, description).await),
            Err(e) => {
                error!(error = %e, name, "Rejected component registration");
                Err(e)
            }
        }
    }

    /// Flip visibility of `name`, returning the new value or `None` when
    /// no entry matches
    pub async fn toggle_visibility(&self, name: &str) -> Option<bool> {
        let mut state = self.state.lock().await;
        let Some(entry) = state.entries.iter_mut().find(|entry| entry.name == name) else {
            warn!(name, "Toggle requested for unknown component");
            return None;
        };

        entry.is_visible = !entry.is_visible;
        let visible = entry.is_visible;
        info!(name, visible, "Toggled component visibility");

        self.persist(&state).await;
        Some(visible)
    }

    pub async fn list(&self) -> Vec<RegistryEntry> {
        self.state.lock().await.entries.clone()
    }

    /// Visible entries in render order
    pub async fn visible(&self) -> Vec<RegistryEntry> {
        self.state
            .lock()
            .await
            .entries
            .iter()
            .filter(|entry| entry.is_visible)
            .cloned()
            .collect()
    }

    async fn persist(&self, state: &RegistryState) {
        if state.phase != LoadPhase::Ready {
            debug!(phase = ?state.phase, "Registry not ready, skipping write-back");
            return;
        }

        if let Err(e) = self.store.set(REGISTRY_KEY, &state.entries).await {
            error!(error = %e, "Failed to persist components");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_helpers::FlakyReadStore;

    async fn setup_loaded_registry() -> (ComponentRegistry, Arc<dyn KeyValueStore>) {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let registry = ComponentRegistry::new(Arc::clone(&store));
        registry.load().await;
        (registry, store)
    }

    fn names(entries: &[RegistryEntry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_load_absent_key_is_empty() {
        let (registry, store) = setup_loaded_registry().await;
        assert!(registry.list().await.is_empty());
        assert_eq!(registry.phase().await, LoadPhase::Ready);
        assert!(store.get_raw(REGISTRY_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_discards_malformed_values() {
        for raw in ["not an array", "{}", "[1, 2]", "[{\"name\": \"x\"}]"] {
            let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
            store.set_raw(REGISTRY_KEY, raw.to_string()).await.unwrap();

            let registry = ComponentRegistry::new(Arc::clone(&store));
            assert!(registry.load().await.is_empty(), "value {raw:?} should be discarded");
            assert!(store.get_raw(REGISTRY_KEY).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_load_preserves_order() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut stored = vec![
            RegistryEntry::new("b", "Comp1", ""),
            RegistryEntry::new("a", "First", "first"),
            RegistryEntry::new("c", "FetchAPI", ""),
        ];
        stored[1].is_visible = false;
        store.set(REGISTRY_KEY, &stored).await.unwrap();

        let registry = ComponentRegistry::new(store);
        assert_eq!(registry.load().await, stored);
    }

    #[tokio::test]
    async fn test_load_is_idempotent() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let registry = ComponentRegistry::new(Arc::clone(&store));
        registry.load().await;
        registry.register("First comp", "First", "").await;

        // A later stored value must not replace the live list
        store.set(REGISTRY_KEY, &Vec::<RegistryEntry>::new()).await.unwrap();
        let entries = registry.load().await;
        assert_eq!(names(&entries), vec!["First comp"]);
    }

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let (registry, _store) = setup_loaded_registry().await;

        assert!(registry.register("Display", "Greetings", "original").await);
        assert!(!registry.register("Display", "Comp1", "replacement").await);
        assert!(registry.register("Counter Comp", "Comp1", "").await);
        assert!(!registry.register("Display", "First", "").await);

        let entries = registry.list().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, "Greetings");
        assert_eq!(entries[0].description, "original");
    }

    #[tokio::test]
    async fn test_register_value_rejects_non_string_kind() {
        let (registry, store) = setup_loaded_registry().await;

        let result = registry
            .register_value("Broken", &serde_json::json!(42), "")
            .await;
        assert_eq!(result, Err(RegistryError::InvalidKind("42".to_string())));
        assert!(registry.list().await.is_empty());
        assert!(store.get_raw(REGISTRY_KEY).await.unwrap().is_none());

        let result = registry
            .register_value("Fine", &serde_json::json!("First"), "")
            .await;
        assert_eq!(result, Ok(true));
    }

    #[tokio::test]
    async fn test_register_persists_when_ready() {
        let (registry, store) = setup_loaded_registry().await;
        registry.register("FetchAPI", "FetchAPI", "Master usage of Fetch API").await;

        let stored: Vec<RegistryEntry> = store.get(REGISTRY_KEY).await.unwrap().unwrap();
        assert_eq!(stored, registry.list().await);
    }

    #[tokio::test]
    async fn test_toggle_twice_restores() {
        let (registry, _store) = setup_loaded_registry().await;
        registry.register("a", "First", "").await;
        registry.register("b", "Comp1", "").await;

        assert_eq!(registry.toggle_visibility("b").await, Some(false));
        let entries = registry.list().await;
        assert!(entries[0].is_visible);
        assert!(!entries[1].is_visible);
        assert_eq!(names(&registry.visible().await), vec!["a"]);

        assert_eq!(registry.toggle_visibility("b").await, Some(true));
        assert!(registry.list().await.iter().all(|entry| entry.is_visible));
    }

    #[tokio::test]
    async fn test_toggle_unknown_is_noop() {
        let (registry, store) = setup_loaded_registry().await;
        registry.register("a", "First", "").await;
        let before = registry.list().await;
        let stored_before = store.get_raw(REGISTRY_KEY).await.unwrap();

        assert_eq!(registry.toggle_visibility("missing").await, None);
        assert_eq!(registry.list().await, before);
        assert_eq!(store.get_raw(REGISTRY_KEY).await.unwrap(), stored_before);
    }

    #[tokio::test]
    async fn test_concurrent_toggles_do_not_lose_updates() {
        let (registry, store) = setup_loaded_registry().await;
        let registry = Arc::new(registry);
        registry.register("a", "First", "").await;
        registry.register("b", "Comp1", "").await;

        let mut handles = Vec::new();
        for i in 0..10 {
            let registry = Arc::clone(&registry);
            let name = if i % 2 == 0 { "a" } else { "b" };
            handles.push(tokio::spawn(async move {
                registry.toggle_visibility(name).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Five flips each: both end up hidden
        let entries = registry.list().await;
        assert!(entries.iter().all(|entry| !entry.is_visible));
        let stored: Vec<RegistryEntry> = store.get(REGISTRY_KEY).await.unwrap().unwrap();
        assert_eq!(stored, entries);
    }

    #[tokio::test]
    async fn test_mutations_before_load_are_not_written() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let persisted = vec![RegistryEntry::new("Saved", "First", "")];
        store.set(REGISTRY_KEY, &persisted).await.unwrap();

        let registry = ComponentRegistry::new(Arc::clone(&store));
        assert_eq!(registry.phase().await, LoadPhase::Uninitialized);
        registry.register("Early", "Comp1", "").await;

        let stored: Vec<RegistryEntry> = store.get(REGISTRY_KEY).await.unwrap().unwrap();
        assert_eq!(stored, persisted);

        // Loading replaces the early in-memory list with the stored one
        assert_eq!(registry.load().await, persisted);
    }

    #[tokio::test]
    async fn test_unreadable_store_blocks_write_back() {
        let store: Arc<dyn KeyValueStore> = Arc::new(FlakyReadStore::new(1));
        let saved = vec![RegistryEntry::new("Saved", "First", "")];
        store.set(REGISTRY_KEY, &saved).await.unwrap();

        let registry = ComponentRegistry::new(Arc::clone(&store));
        assert!(registry.load().await.is_empty());
        assert_eq!(registry.phase().await, LoadPhase::Failed);

        assert!(registry.register("Early", "Comp1", "").await);
        assert_eq!(registry.toggle_visibility("Early").await, Some(false));
        let stored: Vec<RegistryEntry> = store.get(REGISTRY_KEY).await.unwrap().unwrap();
        assert_eq!(stored, saved);

        // The store recovers, so the next load reads it and writes resume
        assert_eq!(registry.load().await, saved);
        assert_eq!(registry.phase().await, LoadPhase::Ready);
        registry.register("Later", "Comp1", "").await;
        let stored: Vec<RegistryEntry> = store.get(REGISTRY_KEY).await.unwrap().unwrap();
        assert_eq!(names(&stored), vec!["Saved", "Later"]);
    }
}
