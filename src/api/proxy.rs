// SPDX-License-Identifier: GPL-3.0-only
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error};

#[derive(thiserror::Error, Debug)]
pub enum ProxyError {
    #[error("Steam API error: {0}")]
    UpstreamStatus(u16),

    #[error("{0}")]
    Network(String),

    #[error("Invalid upstream payload: {0}")]
    Decode(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        error!(error = %self, "Relay config proxy failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

/// Fetches Steam's relay configuration for the browser, which cannot call
/// the upstream directly
#[derive(Debug, Clone)]
pub struct SteamConfigClient {
    client: Client,
    url: String,
}

impl SteamConfigClient {
    pub fn new(url: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("sandbox-daemon/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, url })
    }

    /// The upstream JSON body, untouched
    pub async fn fetch_config(&self) -> Result<Value, ProxyError> {
        debug!(url = %self.url, "Fetching relay config");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ProxyError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProxyError::UpstreamStatus(response.status().as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ProxyError::Decode(e.to_string()))
    }
}
