// SPDX-License-Identifier: GPL-3.0-only
pub mod client;
pub mod demo;
pub mod models;

pub use client::PostsClient;
pub use demo::{PostsDemo, PostsSnapshot};
