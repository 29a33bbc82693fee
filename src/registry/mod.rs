// SPDX-License-Identifier: GPL-3.0-only
pub mod component;
pub mod models;

pub use component::ComponentRegistry;
pub use models::{LoadPhase, RegistryEntry};
