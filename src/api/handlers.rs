// SPDX-License-Identifier: GPL-3.0-only
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::api::proxy::{ProxyError, SteamConfigClient};
use crate::catalog::{DemoCatalog, MountedDemo};
use crate::panel::{PanelRow, TogglePanel};
use crate::posts::{PostsDemo, PostsSnapshot};
use crate::progress::{CompletionFlag, CompletionSnapshot};
use crate::registry::{ComponentRegistry, LoadPhase, RegistryEntry};
use crate::relays::{RelayView, SdrConfig};
use crate::widgets::WidgetStore;

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    /// Left untyped so a non-string `type` reaches validation
    #[serde(rename = "type", default)]
    pub kind: Value,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LimitRequest {
    pub limit: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WidgetRequest {
    pub id: String,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub completed: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct RelayQuery {
    pub region: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

fn api_error(status: StatusCode, message: String) -> ApiError {
    (status, Json(ApiResponse::<()>::error(message)))
}

/// What the app shell renders
#[derive(Debug, Serialize)]
pub struct AppView {
    pub phase: LoadPhase,
    pub demos: Vec<MountedDemo>,
}

#[derive(Debug, Serialize)]
pub struct PanelView {
    pub open: bool,
    pub rows: Vec<PanelRow>,
}

pub struct ApiHandlers {
    registry: Arc<ComponentRegistry>,
    catalog: Arc<DemoCatalog>,
    posts: Arc<PostsDemo>,
    widgets: Arc<WidgetStore>,
    completion: Arc<CompletionFlag>,
    steam: Arc<SteamConfigClient>,
}

impl ApiHandlers {
    pub fn new(
        registry: Arc<ComponentRegistry>,
        catalog: Arc<DemoCatalog>,
        posts: Arc<PostsDemo>,
        widgets: Arc<WidgetStore>,
        completion: Arc<CompletionFlag>,
        steam: Arc<SteamConfigClient>,
    ) -> Self {
        Self {
            registry,
            catalog,
            posts,
            widgets,
            completion,
            steam,
        }
    }
}

impl ApiHandlers {
    pub async fn health() -> Json<ApiResponse<&'static str>> {
        Json(ApiResponse::success("ok"))
    }

    pub async fn steam_config(&self) -> Result<Json<Value>, ProxyError> {
        self.steam.fetch_config().await.map(Json)
    }

    pub async fn relays(
        &self,
        Query(query): Query<RelayQuery>,
    ) -> Result<Json<ApiResponse<RelayView>>, ProxyError> {
        let payload = self.steam.fetch_config().await?;
        let config: SdrConfig =
            serde_json::from_value(payload).map_err(|e| ProxyError::Decode(e.to_string()))?;
        Ok(Json(ApiResponse::success(RelayView::build(
            &config,
            query.region.as_deref(),
        ))))
    }

    pub async fn list_components(&self) -> Json<ApiResponse<Vec<RegistryEntry>>> {
        Json(ApiResponse::success(self.registry.list().await))
    }

    /// Responds with whether the name was new
    pub async fn register_component(
        &self,
        Json(request): Json<RegisterRequest>,
    ) -> Result<Json<ApiResponse<bool>>, ApiError> {
        self.registry
            .register_value(&request.name, &request.kind, &request.description)
            .await
            .map(|added| Json(ApiResponse::success(added)))
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))
    }

    pub async fn toggle_component(
        &self,
        Path(name): Path<String>,
    ) -> Result<Json<ApiResponse<bool>>, ApiError> {
        match self.registry.toggle_visibility(&name).await {
            Some(visible) => Ok(Json(ApiResponse::success(visible))),
            None => Err(api_error(
                StatusCode::NOT_FOUND,
                format!("No component named '{name}'"),
            )),
        }
    }

    pub async fn app(&self) -> Json<ApiResponse<AppView>> {
        let demos = self.catalog.mount(&self.registry.visible().await);
        Json(ApiResponse::success(AppView {
            phase: self.registry.phase().await,
            demos,
        }))
    }

    pub async fn panel(&self, panel: &TogglePanel) -> Json<ApiResponse<PanelView>> {
        Json(ApiResponse::success(PanelView {
            open: panel.is_open(),
            rows: panel.rows(&self.registry).await,
        }))
    }

    pub async fn toggle_from_panel(&self, panel: &TogglePanel, name: &str) -> Option<bool> {
        panel.toggle(&self.registry, name).await
    }

    pub async fn posts(&self) -> Json<ApiResponse<PostsSnapshot>> {
        Json(ApiResponse::success(self.posts.snapshot()))
    }

    /// Persists the limit and starts the refetch without waiting for it
    pub async fn set_post_limit(
        &self,
        Json(request): Json<LimitRequest>,
    ) -> Json<ApiResponse<PostsSnapshot>> {
        let (limit, _) = self.posts.set_limit(&request.limit).await;
        info!(limit, "Post limit changed");
        Json(ApiResponse::success(self.posts.snapshot()))
    }

    pub async fn refetch_posts(&self) -> Json<ApiResponse<PostsSnapshot>> {
        self.posts.refetch();
        Json(ApiResponse::success(self.posts.snapshot()))
    }

    pub async fn cancel_posts(&self) -> Json<ApiResponse<PostsSnapshot>> {
        self.posts.cancel();
        Json(ApiResponse::success(self.posts.snapshot()))
    }

    pub async fn completion(&self) -> Json<ApiResponse<CompletionSnapshot>> {
        Json(ApiResponse::success(self.completion.snapshot()))
    }

    pub async fn set_completion(
        &self,
        Json(request): Json<CompletionRequest>,
    ) -> Json<ApiResponse<CompletionSnapshot>> {
        Json(ApiResponse::success(
            self.completion.set(request.completed).await,
        ))
    }

    pub async fn widgets(&self) -> Json<ApiResponse<BTreeMap<String, bool>>> {
        Json(ApiResponse::success(self.widgets.all().await))
    }

    pub async fn toggle_widget(
        &self,
        Path(id): Path<String>,
    ) -> Result<Json<ApiResponse<bool>>, ApiError> {
        if self.widgets.get(&id).await.is_none() {
            return Err(api_error(
                StatusCode::NOT_FOUND,
                format!("No widget with id '{id}'"),
            ));
        }
        Ok(Json(ApiResponse::success(self.widgets.toggle(&id).await)))
    }

    /// Responds with the widget's state, which is `default` only when the
    /// id was not known yet
    pub async fn register_widget(
        &self,
        Json(request): Json<WidgetRequest>,
    ) -> Json<ApiResponse<bool>> {
        Json(ApiResponse::success(
            self.widgets.register(&request.id, request.default).await,
        ))
    }

    pub async fn reset_widget(
        &self,
        Path(id): Path<String>,
    ) -> Result<Json<ApiResponse<bool>>, ApiError> {
        if self.widgets.get(&id).await.is_none() {
            return Err(api_error(
                StatusCode::NOT_FOUND,
                format!("No widget with id '{id}'"),
            ));
        }
        self.widgets.reset(&id).await;
        Ok(Json(ApiResponse::success(false)))
    }

    pub async fn reset_widgets(&self) -> Json<ApiResponse<BTreeMap<String, bool>>> {
        self.widgets.reset_all().await;
        Json(ApiResponse::success(self.widgets.all().await))
    }
}
