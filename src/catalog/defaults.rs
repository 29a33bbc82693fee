// SPDX-License-Identifier: GPL-3.0-only
use std::collections::HashSet;
use tracing::info;

use crate::registry::ComponentRegistry;

pub struct DefaultComponent {
    pub name: &'static str,
    pub kind: &'static str,
    pub description: &'static str,
}

pub const DEFAULT_COMPONENTS: &[DefaultComponent] = &[
    DefaultComponent {
        name: "First comp",
        kind: "First",
        description: "Your very first component — a simple starter.",
    },
    DefaultComponent {
        name: "Display",
        kind: "Greetings",
        description: "Learn how to pass props — displays a greeting with a name.",
    },
    DefaultComponent {
        name: "Counter Comp",
        kind: "Comp1",
        description: "Master useState — click to increment a counter.",
    },
    DefaultComponent {
        name: "useEffect Deep Dive",
        kind: "UseEffect",
        description: "Master side effects, cleanup, and dependencies.",
    },
    DefaultComponent {
        name: "UseRefComponent",
        kind: "UseRefComponent",
        description: "Master usage of UseRef hook",
    },
    DefaultComponent {
        name: "Assignment1",
        kind: "Assignment1",
        description: "Goal: Build a React page with 3 widgets (boxes in a grid) Each widget has its own toggle switch or control. All states are saved in localStorage. A parent Reset All button can reset all widgets to default by calling each widget's exposed method",
    },
    DefaultComponent {
        name: "FetchAPI",
        kind: "FetchAPI",
        description: "Master usage of Fetch API",
    },
    DefaultComponent {
        name: "OptimizedFetchAPI",
        kind: "OptimizedFetchAPI",
        description: "Master usage of Fetch API and React Optimizations!",
    },
];

/// Register every default entry whose name is not present yet.
///
/// Call after the registry has loaded. Running it again adds nothing:
/// registration is idempotent per name.
pub async fn seed_defaults(registry: &ComponentRegistry) -> usize {
    let existing: HashSet<String> = registry
        .list()
        .await
        .into_iter()
        .map(|entry| entry.name)
        .collect();

    let mut added = 0;
    for component in DEFAULT_COMPONENTS {
        if existing.contains(component.name) {
            continue;
        }
        if registry
            .register(component.name, component.kind, component.description)
            .await
        {
            added += 1;
        }
    }

    if added > 0 {
        info!(added, "Seeded default components");
    }
    added
}
