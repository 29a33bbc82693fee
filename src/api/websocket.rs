// SPDX-License-Identifier: GPL-3.0-only
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::api::handlers::{ApiHandlers, ApiResponse};
use crate::panel::TogglePanel;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
enum WsMessage {
    ListComponents,
    ToggleComponent { name: String },
    OpenPanel,
    ClosePanel,
    TogglePanel,
    Panel,
}

#[derive(Debug, Serialize, Deserialize)]
struct WsResponse {
    success: bool,
    data: Option<serde_json::Value>,
    error: Option<String>,
}

impl<T: Serialize> From<ApiResponse<T>> for WsResponse {
    fn from(response: ApiResponse<T>) -> Self {
        Self {
            success: response.success,
            data: response
                .data
                .and_then(|data| serde_json::to_value(data).ok()),
            error: response.error,
        }
    }
}

impl WsResponse {
    fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

pub struct WebSocketServer {
    handlers: Arc<ApiHandlers>,
}

impl WebSocketServer {
    pub fn new(handlers: Arc<ApiHandlers>) -> Self {
        Self { handlers }
    }

    pub fn router(&self) -> Router {
        let handlers = self.handlers.clone();
        Router::new().route(
            "/ws",
            get(move |ws: WebSocketUpgrade| async move {
                ws.on_upgrade(move |socket| handle_socket(socket, handlers))
            }),
        )
    }
}

async fn handle_socket(socket: WebSocket, handlers: Arc<ApiHandlers>) {
    let connection = Uuid::new_v4();
    info!(%connection, "WebSocket connection opened");

    let (sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut send_task = tokio::spawn(async move {
        let mut sender = sender;
        while let Some(msg) = rx.recv().await {
            if let Err(e) = sender.send(msg).await {
                error!(error = %e, "Failed to send WebSocket message");
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        // Open/closed is local to this connection and never stored
        let mut panel = TogglePanel::new();
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    if let Err(e) = handle_message(text, &handlers, &mut panel, &tx).await {
                        error!(error = %e, "Failed to handle WebSocket message");
                    }
                }
                Message::Close(_) => {
                    info!(%connection, "WebSocket connection closed");
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };
}

async fn handle_message(
    text: String,
    handlers: &ApiHandlers,
    panel: &mut TogglePanel,
    tx: &mpsc::UnboundedSender<Message>,
) -> anyhow::Result<()> {
    let msg: WsMessage = match serde_json::from_str(&text) {
        Ok(m) => m,
        Err(e) => {
            let response = WsResponse::error(format!("Invalid message format: {}", e));
            tx.send(Message::Text(serde_json::to_string(&response)?))?;
            return Ok(());
        }
    };
    debug!(message = ?msg, "WebSocket message received");

    let response: WsResponse = match msg {
        WsMessage::ListComponents => {
            let Json(response) = handlers.list_components().await;
            response.into()
        }
        WsMessage::ToggleComponent { name } => {
            match handlers.toggle_from_panel(panel, &name).await {
                Some(visible) => ApiResponse::success(visible).into(),
                None => WsResponse::error(format!("No component named '{name}'")),
            }
        }
        WsMessage::OpenPanel => {
            panel.open();
            let Json(response) = handlers.panel(panel).await;
            response.into()
        }
        WsMessage::ClosePanel => {
            panel.close();
            let Json(response) = handlers.panel(panel).await;
            response.into()
        }
        WsMessage::TogglePanel => {
            panel.toggle_open();
            let Json(response) = handlers.panel(panel).await;
            response.into()
        }
        WsMessage::Panel => {
            let Json(response) = handlers.panel(panel).await;
            response.into()
        }
    };

    tx.send(Message::Text(serde_json::to_string(&response)?))?;
    Ok(())
}
