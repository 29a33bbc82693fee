// SPDX-License-Identifier: GPL-3.0-only
use std::time::Duration;
use tokio::task::JoinHandle;

/// Cancellable one-shot timer owned by a single instance.
///
/// Scheduling again replaces the pending callback, which also makes this a
/// debounce primitive: reschedule on every event and the callback runs once
/// the events stop. Dropping the timer cancels it.
#[derive(Debug, Default)]
pub struct ResetTimer {
    handle: Option<JoinHandle<()>>,
}

impl ResetTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule<F>(&mut self, delay: Duration, on_fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire();
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for ResetTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
