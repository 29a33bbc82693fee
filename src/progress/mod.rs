// SPDX-License-Identifier: GPL-3.0-only
pub mod completion;

pub use completion::{CompletionFlag, CompletionSnapshot};
