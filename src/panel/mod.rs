// SPDX-License-Identifier: GPL-3.0-only
pub mod toggle;

pub use toggle::{PanelRow, TogglePanel};
