// SPDX-License-Identifier: GPL-3.0-only
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use crate::store::{KeyValueStore, Persisted};

/// Storage key of the effects demo's "Mark as completed" checkbox
pub const USE_EFFECT_COMPLETED_KEY: &str = "useEffectCompleted";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionSnapshot {
    pub completed: bool,
    pub status: String,
}

/// An auto-saved checkbox: loads on start, saves on every change
pub struct CompletionFlag {
    flag: Persisted<bool>,
}

impl CompletionFlag {
    pub async fn open(store: Arc<dyn KeyValueStore>, key: &str) -> Self {
        Self {
            flag: Persisted::open(store, key, false).await,
        }
    }

    pub fn snapshot(&self) -> CompletionSnapshot {
        CompletionSnapshot {
            completed: self.flag.get(),
            status: self.flag.status(),
        }
    }

    /// Save `completed`. A failed write is logged and shows up in the status.
    pub async fn set(&self, completed: bool) -> CompletionSnapshot {
        if let Err(e) = self.flag.set(completed).await {
            error!(error = %e, completed, "Failed to save completion flag");
        }
        self.snapshot()
    }
}
