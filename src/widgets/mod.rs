// SPDX-License-Identifier: GPL-3.0-only
pub mod store;

pub use store::WidgetStore;
