// SPDX-License-Identifier: GPL-3.0-only
pub mod memory;
pub mod persisted;
pub mod sqlite;
pub mod traits;

pub use memory::MemoryStore;
pub use persisted::Persisted;
pub use sqlite::SqliteStore;
pub use traits::{KeyValueStore, StoreError};
