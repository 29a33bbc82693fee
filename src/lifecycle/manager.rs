// SPDX-License-Identifier: GPL-3.0-only
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::lifecycle::timer::ResetTimer;
use crate::lifecycle::traits::{FetchError, Source};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchSnapshot<T> {
    pub phase: Phase,
    pub data: T,
    pub error: Option<String>,
}

struct Inner<T> {
    phase: Phase,
    data: T,
    error: Option<String>,
    /// Bumped on every trigger and on teardown; results carrying an older
    /// generation are discarded
    generation: u64,
    active: Option<CancellationToken>,
    success_timer: ResetTimer,
    error_timer: ResetTimer,
    torn_down: bool,
}

/// Drives one fetch-and-display cycle at a time.
///
/// At most one request is active per instance. Triggering again cancels the
/// previous attempt, and any result it still produces is dropped because its
/// generation no longer matches. Success and error phases fall back to
/// `Idle` after the display window; fetched data is kept.
pub struct RequestLifecycle<P, T> {
    source: Arc<dyn Source<P, T>>,
    inner: Arc<Mutex<Inner<T>>>,
    display_window: Duration,
}

impl<P, T> RequestLifecycle<P, T>
where
    P: Send + Sync + 'static,
    T: Clone + Default + Send + 'static,
{
    pub fn new(source: Arc<dyn Source<P, T>>, display_window: Duration) -> Self {
        Self {
            source,
            inner: Arc::new(Mutex::new(Inner {
                phase: Phase::Idle,
                data: T::default(),
                error: None,
                generation: 0,
                active: None,
                success_timer: ResetTimer::new(),
                error_timer: ResetTimer::new(),
                torn_down: false,
            })),
            display_window,
        }
    }

    /// Start a new attempt, superseding whatever is in flight.
    ///
    /// Returns the handle of the spawned attempt, or `None` after teardown.
    pub fn trigger(&self, params: P) -> Option<JoinHandle<()>> {
        let (generation, token) = {
            let mut inner = self.inner.lock();
            if inner.torn_down {
                warn!("Trigger ignored after teardown");
                return None;
            }

            if let Some(previous) = inner.active.take() {
                debug!(generation = inner.generation, "Canceling superseded request");
                previous.cancel();
            }
            inner.success_timer.cancel();
            inner.error_timer.cancel();

            inner.generation += 1;
            let token = CancellationToken::new();
            inner.active = Some(token.clone());
            inner.phase = Phase::Loading;
            inner.error = None;
            (inner.generation, token)
        };

        debug!(generation, "Request started");
        let source = Arc::clone(&self.source);
        let state = Arc::downgrade(&self.inner);
        let window = self.display_window;

        Some(tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => Err(FetchError::Canceled),
                result = source.fetch(&params) => result,
            };

            if let Some(state) = state.upgrade() {
                settle(&state, generation, outcome, window);
            }
        }))
    }

    /// Cancel the in-flight attempt without starting another
    pub fn cancel(&self) {
        let mut inner = self.inner.lock();
        if let Some(token) = inner.active.take() {
            token.cancel();
            inner.generation += 1;
            if inner.phase == Phase::Loading {
                inner.phase = Phase::Idle;
            }
            debug!("Request canceled by caller");
        }
    }

    pub fn snapshot(&self) -> FetchSnapshot<T> {
        let inner = self.inner.lock();
        FetchSnapshot {
            phase: inner.phase,
            data: inner.data.clone(),
            error: inner.error.clone(),
        }
    }
}

impl<P, T> RequestLifecycle<P, T> {
    /// Cancel the in-flight attempt and every pending timer. Later triggers
    /// are ignored and no callback fires afterwards.
    pub fn teardown(&self) {
        let mut inner = self.inner.lock();
        if inner.torn_down {
            return;
        }
        inner.torn_down = true;
        inner.generation += 1;
        if let Some(token) = inner.active.take() {
            token.cancel();
        }
        inner.success_timer.cancel();
        inner.error_timer.cancel();
        debug!("Request lifecycle torn down");
    }
}

impl<P, T> Drop for RequestLifecycle<P, T> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn settle<T: Send + 'static>(
    state: &Arc<Mutex<Inner<T>>>,
    generation: u64,
    outcome: Result<T, FetchError>,
    window: Duration,
) {
    let mut inner = state.lock();
    if inner.torn_down || inner.generation != generation {
        debug!(generation, current = inner.generation, "Discarding stale response");
        return;
    }
    inner.active = None;

    match outcome {
        Ok(data) => {
            inner.data = data;
            inner.phase = Phase::Success;
            info!(generation, "Request succeeded");

            let weak = Arc::downgrade(state);
            inner.success_timer.schedule(window, move || {
                hide(&weak, generation, Phase::Success);
            });
        }
        // Our own cancellations never get here, they bump the generation
        // first. This is a source aborting its request on its own.
        Err(FetchError::Canceled) => {
            debug!(generation, "Request canceled by source");
            inner.phase = Phase::Idle;
        }
        Err(e) => {
            warn!(generation, error = %e, "Request failed");
            inner.phase = Phase::Error;
            inner.error = Some(e.to_string());

            let weak = Arc::downgrade(state);
            inner.error_timer.schedule(window, move || {
                hide(&weak, generation, Phase::Error);
            });
        }
    }
}

/// Return a settled phase to the quiet baseline once its window expires
fn hide<T>(state: &Weak<Mutex<Inner<T>>>, generation: u64, shown: Phase) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let mut inner = state.lock();
    if inner.torn_down || inner.generation != generation || inner.phase != shown {
        return;
    }

    inner.phase = Phase::Idle;
    if shown == Phase::Error {
        inner.error = None;
    }
}
