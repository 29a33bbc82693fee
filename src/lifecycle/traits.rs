// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The attempt was superseded or torn down. Never shown to users.
    #[error("Request canceled")]
    Canceled,

    #[error("{0}")]
    Network(String),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("Invalid response body: {0}")]
    Decode(String),
}

/// Something a [`RequestLifecycle`](crate::lifecycle::RequestLifecycle) can
/// fetch from
#[async_trait]
pub trait Source<P, T>: Send + Sync {
    async fn fetch(&self, params: &P) -> Result<T, FetchError>;
}
