// SPDX-License-Identifier: GPL-3.0-only
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::api::handlers::{
    ApiError, ApiHandlers, ApiResponse, AppView, CompletionRequest, LimitRequest, PanelView,
    RegisterRequest, RelayQuery, WidgetRequest,
};
use crate::api::proxy::ProxyError;
use crate::api::websocket::WebSocketServer;
use crate::panel::TogglePanel;
use crate::posts::PostsSnapshot;
use crate::progress::CompletionSnapshot;
use crate::registry::RegistryEntry;
use crate::relays::RelayView;

pub struct HttpServer {
    handlers: Arc<ApiHandlers>,
    addr: SocketAddr,
}

impl HttpServer {
    pub fn new(handlers: ApiHandlers, addr: SocketAddr) -> Self {
        Self {
            handlers: Arc::new(handlers),
            addr,
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/steamconfig", get(steam_config_handler))
            .route("/api/health", get(health_handler))
            .route("/api/relays", get(relays_handler))
            .route(
                "/api/components",
                get(list_components_handler).post(register_component_handler),
            )
            .route("/api/components/:name/toggle", post(toggle_component_handler))
            .route("/api/app", get(app_handler))
            .route("/api/panel", get(panel_handler))
            .route("/api/posts", get(posts_handler))
            .route("/api/posts/limit", post(set_post_limit_handler))
            .route("/api/posts/refetch", post(refetch_posts_handler))
            .route("/api/posts/cancel", post(cancel_posts_handler))
            .route(
                "/api/use-effect/completed",
                get(completion_handler).post(set_completion_handler),
            )
            .route(
                "/api/widgets",
                get(widgets_handler).post(register_widget_handler),
            )
            .route("/api/widgets/:id/toggle", post(toggle_widget_handler))
            .route("/api/widgets/:id/reset", post(reset_widget_handler))
            .route("/api/widgets/reset", post(reset_widgets_handler))
            .with_state(self.handlers.clone())
            .merge(WebSocketServer::new(self.handlers.clone()).router())
            .layer(CorsLayer::permissive())
    }

    pub async fn serve(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(&self.addr).await?;
        self.serve_on(listener).await
    }

    pub async fn serve_on(self, listener: TcpListener) -> anyhow::Result<()> {
        let app = self.router();

        info!(addr = %listener.local_addr()?, "Starting HTTP server");
        axum::serve(listener, app).await?;

        Ok(())
    }
}

type Handlers = State<Arc<ApiHandlers>>;

async fn steam_config_handler(State(handlers): Handlers) -> Result<Json<Value>, ProxyError> {
    handlers.steam_config().await
}

async fn health_handler() -> Json<ApiResponse<&'static str>> {
    ApiHandlers::health().await
}

async fn relays_handler(
    State(handlers): Handlers,
    query: Query<RelayQuery>,
) -> Result<Json<ApiResponse<RelayView>>, ProxyError> {
    handlers.relays(query).await
}

async fn list_components_handler(
    State(handlers): Handlers,
) -> Json<ApiResponse<Vec<RegistryEntry>>> {
    handlers.list_components().await
}

async fn register_component_handler(
    State(handlers): Handlers,
    request: Json<RegisterRequest>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    handlers.register_component(request).await
}

async fn toggle_component_handler(
    State(handlers): Handlers,
    name: Path<String>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    handlers.toggle_component(name).await
}

async fn app_handler(State(handlers): Handlers) -> Json<ApiResponse<AppView>> {
    handlers.app().await
}

// Stateless over HTTP, so the panel always reports closed
async fn panel_handler(State(handlers): Handlers) -> Json<ApiResponse<PanelView>> {
    handlers.panel(&TogglePanel::new()).await
}

async fn posts_handler(State(handlers): Handlers) -> Json<ApiResponse<PostsSnapshot>> {
    handlers.posts().await
}

async fn set_post_limit_handler(
    State(handlers): Handlers,
    request: Json<LimitRequest>,
) -> Json<ApiResponse<PostsSnapshot>> {
    handlers.set_post_limit(request).await
}

async fn refetch_posts_handler(State(handlers): Handlers) -> Json<ApiResponse<PostsSnapshot>> {
    handlers.refetch_posts().await
}

async fn cancel_posts_handler(State(handlers): Handlers) -> Json<ApiResponse<PostsSnapshot>> {
    handlers.cancel_posts().await
}

async fn completion_handler(State(handlers): Handlers) -> Json<ApiResponse<CompletionSnapshot>> {
    handlers.completion().await
}

async fn set_completion_handler(
    State(handlers): Handlers,
    request: Json<CompletionRequest>,
) -> Json<ApiResponse<CompletionSnapshot>> {
    handlers.set_completion(request).await
}

async fn widgets_handler(State(handlers): Handlers) -> Json<ApiResponse<BTreeMap<String, bool>>> {
    handlers.widgets().await
}

async fn toggle_widget_handler(
    State(handlers): Handlers,
    id: Path<String>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    handlers.toggle_widget(id).await
}

async fn register_widget_handler(
    State(handlers): Handlers,
    request: Json<WidgetRequest>,
) -> Json<ApiResponse<bool>> {
    handlers.register_widget(request).await
}

async fn reset_widget_handler(
    State(handlers): Handlers,
    id: Path<String>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    handlers.reset_widget(id).await
}

async fn reset_widgets_handler(
    State(handlers): Handlers,
) -> Json<ApiResponse<BTreeMap<String, bool>>> {
    handlers.reset_widgets().await
}
