// SPDX-License-Identifier: GPL-3.0-only
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::lifecycle::{FetchSnapshot, RequestLifecycle, Source};
use crate::posts::models::Post;
use crate::store::{KeyValueStore, Persisted};

/// Storage key for the requested post count
pub const LIMIT_KEY: &str = "fetch-api-limit";

/// Coerce user input into a request size of at least 1.
///
/// Numbers are truncated, strings contribute their leading integer, and
/// anything unparseable becomes 1. There is no upper bound.
pub fn parse_limit(input: &Value) -> u32 {
    let parsed = match input {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => leading_integer(s.trim()),
        _ => None,
    };

    parsed.unwrap_or(1).clamp(1, i64::from(u32::MAX)) as u32
}

fn leading_integer(text: &str) -> Option<i64> {
    let digits_start = usize::from(text.starts_with(['-', '+']));
    let digits_len = text[digits_start..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }

    let end = digits_start + digits_len;
    // Saturate instead of failing on absurdly long digit runs
    Some(text[..end].parse::<i64>().unwrap_or(if text.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    }))
}

#[derive(Debug, Clone, Serialize)]
pub struct PostsSnapshot {
    pub limit: u32,
    pub limit_status: String,
    #[serde(flatten)]
    pub state: FetchSnapshot<Vec<Post>>,
}

/// The posts fetch demo: a persisted request size driving a request
/// lifecycle. Changing the limit persists it and refetches.
pub struct PostsDemo {
    limit: Persisted<u32>,
    lifecycle: RequestLifecycle<u32, Vec<Post>>,
    /// Serializes limit changes so requests go out in persist order
    update: Mutex<()>,
}

impl PostsDemo {
    /// Restore the stored limit and start the initial fetch
    pub async fn open(
        store: Arc<dyn KeyValueStore>,
        source: Arc<dyn Source<u32, Vec<Post>>>,
        default_limit: u32,
        display_window: Duration,
    ) -> Self {
        let limit = Persisted::open(store, LIMIT_KEY, default_limit.max(1)).await;
        let demo = Self {
            limit,
            lifecycle: RequestLifecycle::new(source, display_window),
            update: Mutex::new(()),
        };

        info!(limit = demo.limit(), "Posts demo ready");
        demo.refetch();
        demo
    }

    pub fn limit(&self) -> u32 {
        self.limit.get().max(1)
    }

    /// Store a new limit from raw input and refetch with it.
    ///
    /// The limit is persisted regardless of how the fetch turns out.
    pub async fn set_limit(&self, input: &Value) -> (u32, Option<JoinHandle<()>>) {
        let limit = parse_limit(input);
        let _update = self.update.lock().await;
        if let Err(e) = self.limit.set(limit).await {
            error!(error = %e, limit, "Failed to persist post limit");
        }

        (limit, self.lifecycle.trigger(limit))
    }

    pub fn refetch(&self) -> Option<JoinHandle<()>> {
        self.lifecycle.trigger(self.limit())
    }

    /// Drop the in-flight fetch, if any, without starting another
    pub fn cancel(&self) {
        self.lifecycle.cancel();
    }

    pub fn snapshot(&self) -> PostsSnapshot {
        PostsSnapshot {
            limit: self.limit(),
            limit_status: self.limit.status(),
            state: self.lifecycle.snapshot(),
        }
    }

    pub fn teardown(&self) {
        self.lifecycle.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{FetchError, Phase};
    use crate::store::MemoryStore;
    use crate::test_helpers::SlowWriteStore;
    use async_trait::async_trait;
    use serde_json::json;

    /// Returns `limit` generated posts
    struct FakePosts;

    #[async_trait]
    impl Source<u32, Vec<Post>> for FakePosts {
        async fn fetch(&self, limit: &u32) -> Result<Vec<Post>, FetchError> {
            Ok((1..=u64::from(*limit))
                .map(|id| Post {
                    id,
                    user_id: 1,
                    title: format!("post {id}"),
                    body: String::new(),
                })
                .collect())
        }
    }

    async fn open_demo(store: Arc<dyn KeyValueStore>) -> PostsDemo {
        PostsDemo::open(store, Arc::new(FakePosts), 5, Duration::from_millis(3000)).await
    }

    #[test]
    fn test_parse_limit_clamps() {
        assert_eq!(parse_limit(&json!(0)), 1);
        assert_eq!(parse_limit(&json!(-5)), 1);
        assert_eq!(parse_limit(&json!("abc")), 1);
        assert_eq!(parse_limit(&json!(null)), 1);
        assert_eq!(parse_limit(&json!(true)), 1);
        assert_eq!(parse_limit(&json!(37)), 37);
        assert_eq!(parse_limit(&json!("37")), 37);
        assert_eq!(parse_limit(&json!(" 12posts")), 12);
        assert_eq!(parse_limit(&json!(7.9)), 7);
        assert_eq!(parse_limit(&json!("-3")), 1);
        assert_eq!(parse_limit(&json!(500)), 500);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_fetches_default_limit() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let demo = open_demo(Arc::clone(&store)).await;
        tokio::time::sleep(Duration::from_millis(1)).await;

        let snapshot = demo.snapshot();
        assert_eq!(snapshot.limit, 5);
        assert_eq!(snapshot.state.phase, Phase::Success);
        assert_eq!(snapshot.state.data.len(), 5);
        assert_eq!(store.get::<u32>(LIMIT_KEY).await.unwrap(), Some(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_limit_persists_and_refetches() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let demo = open_demo(Arc::clone(&store)).await;

        let (limit, handle) = demo.set_limit(&json!("37")).await;
        assert_eq!(limit, 37);
        handle.unwrap().await.unwrap();
        assert_eq!(demo.snapshot().state.data.len(), 37);
        demo.teardown();

        // Survives a reload of the store adapter
        let reopened = open_demo(store).await;
        assert_eq!(reopened.limit(), 37);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_limit_coerces_bad_input() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let demo = open_demo(Arc::clone(&store)).await;

        for input in [json!(0), json!(-5), json!("abc")] {
            let (limit, _) = demo.set_limit(&input).await;
            assert_eq!(limit, 1);
            assert_eq!(store.get::<u32>(LIMIT_KEY).await.unwrap(), Some(1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_ignores_refetch() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let demo = open_demo(store).await;
        demo.teardown();
        assert!(demo.refetch().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_limit_changes_fetch_last_limit() {
        let store: Arc<dyn KeyValueStore> =
            Arc::new(SlowWriteStore::new("2", Duration::from_millis(50)));
        let demo = open_demo(Arc::clone(&store)).await;

        let (limit_two, limit_three) = (json!(2), json!(3));
        let ((_, first), (_, second)) =
            tokio::join!(demo.set_limit(&limit_two), demo.set_limit(&limit_three));
        for handle in [first, second].into_iter().flatten() {
            handle.await.unwrap();
        }

        let snapshot = demo.snapshot();
        assert_eq!(snapshot.limit, 3);
        assert_eq!(snapshot.state.data.len(), 3);
        assert_eq!(store.get::<u32>(LIMIT_KEY).await.unwrap(), Some(3));
    }
}
