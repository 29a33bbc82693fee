// SPDX-License-Identifier: GPL-3.0-only
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{error, info};

use crate::store::traits::{KeyValueStore, StoreError};

struct Slot<T> {
    value: T,
    status: String,
}

/// A single typed value bound to one storage key.
///
/// Every transition leaves a human-readable status line describing what
/// happened to the stored entry.
pub struct Persisted<T> {
    store: Arc<dyn KeyValueStore>,
    key: String,
    slot: Mutex<Slot<T>>,
    /// Held from the in-memory update until the store write lands, so the
    /// last `set` wins in both places
    write: tokio::sync::Mutex<()>,
}

impl<T> Persisted<T>
where
    T: Serialize + DeserializeOwned + Clone + Display + Send + Sync,
{
    /// Read `key`, seeding it with `default` when absent.
    ///
    /// Never fails: an unreadable entry is logged and the default is used.
    pub async fn open(store: Arc<dyn KeyValueStore>, key: impl Into<String>, default: T) -> Self {
        let key = key.into();

        let (value, status) = match store.get::<T>(&key).await {
            Ok(Some(value)) => {
                let status = format!("Entry '{}' exists in storage with value: {}", key, value);
                (value, status)
            }
            Ok(None) => {
                if let Err(e) = store.set(&key, &default).await {
                    error!(error = %e, key = %key, "Failed to seed default value");
                }
                let status = format!(
                    "No entry found. Created '{}' in storage with default value: {}",
                    key, default
                );
                (default, status)
            }
            Err(e) => {
                error!(error = %e, key = %key, "Failed to read persisted value");
                let status = format!("Error reading from storage. Using default value: {}", default);
                (default, status)
            }
        };

        Self {
            store,
            key,
            slot: Mutex::new(Slot { value, status }),
            write: tokio::sync::Mutex::new(()),
        }
    }

    pub fn get(&self) -> T {
        self.slot.lock().value.clone()
    }

    pub fn status(&self) -> String {
        self.slot.lock().status.clone()
    }

    /// Update the value and write it through to the store
    pub async fn set(&self, value: T) -> Result<(), StoreError> {
        let _write = self.write.lock().await;
        self.slot.lock().value = value.clone();

        match self.store.set(&self.key, &value).await {
            Ok(()) => {
                info!(key = %self.key, value = %value, "Persisted value");
                self.slot.lock().status = format!("Saved value '{}' to storage.", value);
                Ok(())
            }
            Err(e) => {
                self.slot.lock().status = format!("Failed to save value '{}': {}", value, e);
                Err(e)
            }
        }
    }
}
