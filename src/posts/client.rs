// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::lifecycle::{FetchError, Source};
use crate::posts::models::Post;

/// Client for the public posts demo API (`GET <url>?_limit=<n>`)
#[derive(Debug, Clone)]
pub struct PostsClient {
    client: Client,
    url: String,
}

impl PostsClient {
    pub fn new(url: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("sandbox-daemon/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl Source<u32, Vec<Post>> for PostsClient {
    async fn fetch(&self, limit: &u32) -> Result<Vec<Post>, FetchError> {
        debug!(url = %self.url, limit, "Fetching posts");

        let response = self
            .client
            .get(&self.url)
            .query(&[("_limit", limit)])
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        response
            .json::<Vec<Post>>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}
