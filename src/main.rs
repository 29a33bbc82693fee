// SPDX-License-Identifier: GPL-3.0-only
mod api;
mod catalog;
mod config;
mod lifecycle;
mod logging;
mod panel;
mod posts;
mod progress;
mod registry;
mod relays;
mod store;
mod widgets;

#[cfg(test)]
mod test_helpers;

use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use api::{ApiHandlers, HttpServer, SteamConfigClient};
use catalog::{seed_defaults, DemoCatalog};
use config::Config;
use logging::setup_logging;
use posts::{PostsClient, PostsDemo};
use progress::completion::{CompletionFlag, USE_EFFECT_COMPLETED_KEY};
use registry::ComponentRegistry;
use store::{KeyValueStore, SqliteStore};
use widgets::WidgetStore;

/// Wire every sandbox service on top of `store`.
///
/// The registry is loaded before the defaults are seeded, so seeding never
/// races the initial read. The posts demo is returned separately for
/// teardown on shutdown.
async fn compose(
    config: &Config,
    store: Arc<dyn KeyValueStore>,
) -> anyhow::Result<(ApiHandlers, Arc<PostsDemo>)> {
    let registry = Arc::new(ComponentRegistry::new(store.clone()));
    registry.load().await;
    seed_defaults(&registry).await;

    let widgets = Arc::new(WidgetStore::open(store.clone(), config.widget_count).await);

    let completion =
        Arc::new(CompletionFlag::open(store.clone(), USE_EFFECT_COMPLETED_KEY).await);

    let posts_client = Arc::new(PostsClient::new(config.posts_api_url.clone())?);
    let posts = Arc::new(
        PostsDemo::open(
            store,
            posts_client,
            config.default_post_limit,
            config.message_display(),
        )
        .await,
    );

    let steam = Arc::new(SteamConfigClient::new(config.steam_config_url.clone())?);

    let handlers = ApiHandlers::new(
        registry,
        Arc::new(DemoCatalog::standard()),
        posts.clone(),
        widgets,
        completion,
        steam,
    );
    Ok((handlers, posts))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;
    config.validate()?;

    // Initialize logging
    setup_logging(&config.log_level, config.log_json)?;

    info!("Starting sandbox-daemon v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new(&config.store_db_path).await?);
    info!("Store opened at {}", config.store_db_path.display());

    let (handlers, posts) = compose(&config, store).await?;

    let http_server = HttpServer::new(handlers, config.listen_addr);
    let http_task = tokio::spawn(async move {
        if let Err(e) = http_server.serve().await {
            error!(error = %e, "HTTP server error");
        }
    });

    info!("All services started. Waiting for shutdown signal...");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal (Ctrl+C)");
        }
        Err(err) => {
            error!(error = %err, "Unable to listen for shutdown signal");
        }
    }

    info!("Initiating graceful shutdown...");

    posts.teardown();
    http_task.abort();

    info!("Shutdown complete");
    Ok(())
}
