// SPDX-License-Identifier: GPL-3.0-only
pub mod defaults;
pub mod demos;

pub use defaults::seed_defaults;
pub use demos::{DemoCatalog, MountedDemo};
