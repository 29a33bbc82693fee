// SPDX-License-Identifier: GPL-3.0-only
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database backing the key-value store
    pub store_db_path: PathBuf,

    /// Bind address for the proxy and the sandbox API
    pub listen_addr: SocketAddr,

    /// Upstream relay configuration served under `/steamconfig`
    pub steam_config_url: String,

    /// Public posts API used by the fetch demo
    pub posts_api_url: String,

    /// How long success and error messages stay visible
    pub message_display_ms: u64,

    pub default_post_limit: u32,

    /// Number of toggle widgets in the widget group demo
    pub widget_count: u32,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
}

impl Config {
    /// Load configuration from TOML file with environment variable overrides
    pub fn load() -> anyhow::Result<Self> {
        let config_path =
            std::env::var("SANDBOX_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

        let mut config: Config = if std::path::Path::new(&config_path).exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            toml::from_str(&contents)?
        } else {
            Config::default()
        };

        if let Ok(val) = std::env::var("SANDBOX_STORE_DB_PATH") {
            config.store_db_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("SANDBOX_LISTEN_ADDR") {
            config.listen_addr = SocketAddr::from_str(&val)?;
        }
        if let Ok(val) = std::env::var("SANDBOX_STEAM_CONFIG_URL") {
            config.steam_config_url = val;
        }
        if let Ok(val) = std::env::var("SANDBOX_POSTS_API_URL") {
            config.posts_api_url = val;
        }
        if let Ok(val) = std::env::var("SANDBOX_MESSAGE_DISPLAY_MS") {
            config.message_display_ms = val.parse()?;
        }
        if let Ok(val) = std::env::var("SANDBOX_DEFAULT_POST_LIMIT") {
            config.default_post_limit = val.parse()?;
        }
        if let Ok(val) = std::env::var("SANDBOX_WIDGET_COUNT") {
            config.widget_count = val.parse()?;
        }
        if let Ok(val) = std::env::var("SANDBOX_LOG_LEVEL") {
            config.log_level = val;
        }
        if let Ok(val) = std::env::var("SANDBOX_LOG_JSON") {
            config.log_json = val.parse()?;
        }

        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (field, value) in [
            ("steam_config_url", &self.steam_config_url),
            ("posts_api_url", &self.posts_api_url),
        ] {
            let url = Url::parse(value)
                .map_err(|e| anyhow::anyhow!("{field} is not a valid URL ({value}): {e}"))?;
            if !matches!(url.scheme(), "http" | "https") {
                bail!("{field} must use http or https, got: {}", url.scheme());
            }
        }
        if self.message_display_ms == 0 {
            bail!("message_display_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn message_display(&self) -> Duration {
        Duration::from_millis(self.message_display_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_db_path: PathBuf::from("sandbox.db"),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            steam_config_url: String::from(
                "https://api.steampowered.com/ISteamApps/GetSDRConfig/v1/?appid=730",
            ),
            posts_api_url: String::from("https://jsonplaceholder.typicode.com/posts"),
            message_display_ms: 3000,
            default_post_limit: 5,
            widget_count: 3,
            log_level: String::from("info"),
            log_json: false,
        }
    }
}
