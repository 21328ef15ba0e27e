use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path};

/// One entry of the external route registry.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_path: Option<String>,
}

/// Read-only lookup from route ids to registered routes. Optional
/// collaborator of the diagnostics engine: when absent, route-sync checks
/// are skipped.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct RouteIndex {
    /// Map of route id to its registered route.
    pub routes: HashMap<String, RouteEntry>,
}

impl RouteIndex {
    /// Load a route registry from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let txt = fs::read_to_string(path)
            .with_context(|| format!("unable to read route registry at {}", path.display()))?;
        serde_json::from_str(&txt)
            .with_context(|| format!("unsupported route registry format in {}", path.display()))
    }

    pub fn contains(&self, route_id: &str) -> bool {
        self.routes.contains_key(route_id)
    }

    pub fn get(&self, route_id: &str) -> Option<&RouteEntry> {
        self.routes.get(route_id)
    }

    pub fn insert(&mut self, route_id: impl Into<String>, route_path: Option<String>) {
        self.routes
            .insert(route_id.into(), RouteEntry { route_path });
    }
}
