// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Malformed value under '{key}': {source}")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize value for '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage backend error: {0}")]
    Backend(#[from] sqlx::Error),
}

/// Durable string-keyed storage holding JSON text.
///
/// One store is shared by every consumer in the process, so keys are
/// namespaced by purpose (`comps`, `fetch-api-limit`, `widget-state-<id>`).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Raw text stored under `key`, `None` when absent
    async fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite the text stored under `key`
    async fn set_raw(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Remove `key`; removing an absent key is not an error
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl dyn KeyValueStore {
    /// Read and decode the JSON value under `key`.
    ///
    /// A missing key is `Ok(None)`. Text that does not decode into `T`
    /// yields [`StoreError::Deserialization`]; callers decide how to recover.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.get_raw(key).await? {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|source| StoreError::Deserialization {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Encode `value` as JSON and store it under `key`
    pub async fn set<T: Serialize + Sync + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let text = serde_json::to_string(value).map_err(|source| StoreError::Serialization {
            key: key.to_string(),
            source,
        })?;
        self.set_raw(key, text).await
    }
}
