// SPDX-License-Identifier: GPL-3.0-only
pub mod manager;
pub mod timer;
pub mod traits;

pub use manager::{FetchSnapshot, Phase, RequestLifecycle};
pub use traits::{FetchError, Source};
