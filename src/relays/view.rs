// SPDX-License-Identifier: GPL-3.0-only
use serde::Serialize;
use std::collections::BTreeMap;

use crate::relays::models::{Relay, SdrConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Continent {
    Europe,
    #[serde(rename = "USA")]
    Usa,
    Asia,
    Other,
}

/// Coarse bounding-box classification of a relay location
pub fn continent_of(lon: f64, lat: f64) -> Continent {
    if (35.0..=72.0).contains(&lat) && (-25.0..=45.0).contains(&lon) {
        Continent::Europe
    } else if (24.0..=50.0).contains(&lat) && (-125.0..=-65.0).contains(&lon) {
        Continent::Usa
    } else if (-10.0..=55.0).contains(&lat) && (60.0..=150.0).contains(&lon) {
        Continent::Asia
    } else {
        Continent::Other
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionOption {
    pub code: String,
    pub desc: String,
}

/// What the relay viewer shows: selectable regions grouped by continent
/// and the relays of the selected region
#[derive(Debug, Clone, Serialize)]
pub struct RelayView {
    pub region: Option<String>,
    pub groups: BTreeMap<Continent, Vec<RegionOption>>,
    pub relays: Vec<Relay>,
}

impl RelayView {
    /// Build the view for `requested`, see [`select_region`]
    pub fn build(config: &SdrConfig, requested: Option<&str>) -> Self {
        let region = select_region(config, requested);

        let relays = region
            .as_deref()
            .and_then(|code| config.pops.get(code))
            .map(|pop| pop.relays.clone())
            .unwrap_or_default();

        Self {
            region,
            groups: group_regions(config),
            relays,
        }
    }
}

/// The requested region, or the first region that has relays when nothing
/// is requested
pub fn select_region(config: &SdrConfig, requested: Option<&str>) -> Option<String> {
    requested
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .or_else(|| {
            config
                .pops
                .iter()
                .find(|(_, pop)| !pop.relays.is_empty())
                .map(|(code, _)| code.clone())
        })
}

/// Regions with at least one relay, grouped by continent
pub fn group_regions(config: &SdrConfig) -> BTreeMap<Continent, Vec<RegionOption>> {
    let mut groups: BTreeMap<Continent, Vec<RegionOption>> = BTreeMap::new();
    for (code, pop) in &config.pops {
        if pop.relays.is_empty() {
            continue;
        }
        let continent = pop
            .geo
            .map(|[lon, lat]| continent_of(lon, lat))
            .unwrap_or(Continent::Other);
        groups.entry(continent).or_default().push(RegionOption {
            code: code.clone(),
            desc: pop.desc.clone(),
        });
    }
    groups
}
