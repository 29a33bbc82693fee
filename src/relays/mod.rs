// SPDX-License-Identifier: GPL-3.0-only
pub mod models;
pub mod view;

pub use models::SdrConfig;
pub use view::RelayView;
