// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The part of Steam's SDR relay configuration the relay viewer reads
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SdrConfig {
    #[serde(default)]
    pub pops: BTreeMap<String, Pop>,
}

/// A point of presence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pop {
    #[serde(default)]
    pub desc: String,

    /// `[longitude, latitude]`
    #[serde(default)]
    pub geo: Option<[f64; 2]>,

    #[serde(default)]
    pub relays: Vec<Relay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relay {
    pub ipv4: String,

    #[serde(default)]
    pub port_range: Option<[u16; 2]>,
}
