// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::api::HttpServer;
use crate::config::Config;
use crate::store::{KeyValueStore, MemoryStore, StoreError};

pub fn memory_store() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryStore::new())
}

/// Test configuration whose upstreams live on `upstream` (a mock server)
pub fn create_test_config(upstream: &str) -> Config {
    let temp_dir = std::env::temp_dir().join(format!("sandbox-test-{}", uuid::Uuid::new_v4()));

    Config {
        store_db_path: temp_dir.join("store.db"),
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        steam_config_url: format!("{upstream}/sdr"),
        posts_api_url: format!("{upstream}/posts"),
        message_display_ms: 3000,
        default_post_limit: 5,
        widget_count: 3,
        log_level: "error".to_string(),
        log_json: false,
    }
}

/// Compose the services over `store` and serve them on an ephemeral port
pub async fn spawn_test_server(config: &Config, store: Arc<dyn KeyValueStore>) -> SocketAddr {
    let (handlers, _posts) = crate::compose(config, store)
        .await
        .expect("Failed to compose test services");
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no local address");

    let server = HttpServer::new(handlers, addr);
    tokio::spawn(async move {
        let _ = server.serve_on(listener).await;
    });
    addr
}

/// Store whose writes of `slow_value` take `delay` to land
pub struct SlowWriteStore {
    inner: MemoryStore,
    slow_value: String,
    delay: Duration,
}

impl SlowWriteStore {
    pub fn new(slow_value: &str, delay: Duration) -> Self {
        Self {
            inner: MemoryStore::new(),
            slow_value: slow_value.to_string(),
            delay,
        }
    }
}

#[async_trait]
impl KeyValueStore for SlowWriteStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get_raw(key).await
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<(), StoreError> {
        if value == self.slow_value {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.set_raw(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key).await
    }
}

/// Store whose first `failures` reads fail with a backend error
pub struct FlakyReadStore {
    inner: MemoryStore,
    failures: AtomicUsize,
}

impl FlakyReadStore {
    pub fn new(failures: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            failures: AtomicUsize::new(failures),
        }
    }
}

#[async_trait]
impl KeyValueStore for FlakyReadStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StoreError::Backend(sqlx::Error::PoolTimedOut));
        }
        self.inner.get_raw(key).await
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.inner.set_raw(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key).await
    }
}
