// SPDX-License-Identifier: GPL-3.0-only
pub mod handlers;
pub mod http;
pub mod proxy;
pub mod websocket;

pub use handlers::ApiHandlers;
pub use http::HttpServer;
pub use proxy::SteamConfigClient;
