//! Usage: MCP server config types (tagged config variants, active/disabled partition).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Process-spawn server definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StdioConfig {
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    /// Fields this app does not model (timeouts, descriptions, transport
    /// hints). Preserved verbatim so moves between maps never lose payload.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Remote (sse/http) server definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub url: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A server config is either stdio-shaped or network-shaped, distinguished by
/// which required field is present (`command` vs `url`), matching the on-disk
/// JSON the clients consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerConfig {
    Stdio(StdioConfig),
    Network(NetworkConfig),
}

impl ServerConfig {
    pub fn stdio(command: impl Into<String>, args: Vec<String>) -> Self {
        ServerConfig::Stdio(StdioConfig {
            command: command.into(),
            args,
            env: BTreeMap::new(),
            extra: BTreeMap::new(),
        })
    }

    pub fn network(url: impl Into<String>) -> Self {
        ServerConfig::Network(NetworkConfig {
            url: url.into(),
            headers: BTreeMap::new(),
            extra: BTreeMap::new(),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ServerConfig::Stdio(_) => "stdio",
            ServerConfig::Network(_) => "network",
        }
    }
}

/// The active/disabled partition of one (client, path) pair's servers.
///
/// Invariant: a name lives in at most one of the two maps. All mutation goes
/// through methods that uphold this; [`ServerPartition::reconcile`] repairs
/// files edited behind our back (active wins).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerPartition {
    active: BTreeMap<String, ServerConfig>,
    disabled: BTreeMap<String, ServerConfig>,
}

impl ServerPartition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw maps, dropping disabled duplicates of active names.
    /// Returns the dropped names so the caller can log them.
    pub fn reconcile(
        active: BTreeMap<String, ServerConfig>,
        mut disabled: BTreeMap<String, ServerConfig>,
    ) -> (Self, Vec<String>) {
        let dropped: Vec<String> = disabled
            .keys()
            .filter(|name| active.contains_key(*name))
            .cloned()
            .collect();
        for name in &dropped {
            disabled.remove(name);
        }
        (ServerPartition { active, disabled }, dropped)
    }

    pub fn active(&self) -> &BTreeMap<String, ServerConfig> {
        &self.active
    }

    pub fn disabled(&self) -> &BTreeMap<String, ServerConfig> {
        &self.disabled
    }

    pub fn contains(&self, name: &str) -> bool {
        self.active.contains_key(name) || self.disabled.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.active.len() + self.disabled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.disabled.is_empty()
    }

    pub fn insert_active(&mut self, name: impl Into<String>, config: ServerConfig) {
        let name = name.into();
        self.disabled.remove(&name);
        self.active.insert(name, config);
    }

    pub fn insert_disabled(&mut self, name: impl Into<String>, config: ServerConfig) {
        let name = name.into();
        self.active.remove(&name);
        self.disabled.insert(name, config);
    }

    /// Move a disabled server into the active map. Missing names are a no-op
    /// (`false`); the payload crosses unchanged.
    pub fn enable(&mut self, name: &str) -> bool {
        match self.disabled.remove(name) {
            Some(config) => {
                self.active.insert(name.to_string(), config);
                true
            }
            None => false,
        }
    }

    /// Move an active server into the disabled map. Missing names are a no-op.
    pub fn disable(&mut self, name: &str) -> bool {
        match self.active.remove(name) {
            Some(config) => {
                self.disabled.insert(name.to_string(), config);
                true
            }
            None => false,
        }
    }

    /// Remove a server from whichever map holds it.
    pub fn remove(&mut self, name: &str) -> bool {
        self.active.remove(name).is_some() || self.disabled.remove(name).is_some()
    }

    /// Additive merge: source entries are added or updated, destination-only
    /// entries stay. Collisions take the source's config AND the source's
    /// active/disabled placement, so the disjointness invariant holds.
    pub fn merge_from(&mut self, source: &ServerPartition) {
        for (name, config) in &source.active {
            self.insert_active(name.clone(), config.clone());
        }
        for (name, config) in &source.disabled {
            self.insert_disabled(name.clone(), config.clone());
        }
    }
}

/// One requested sync between two clients; consumed by a single call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub from_client: String,
    #[serde(default)]
    pub from_path: Option<String>,
    pub to_client: String,
    #[serde(default)]
    pub to_path: Option<String>,
    /// Replace the destination wholesale instead of merging additively.
    #[serde(default)]
    pub override_all: bool,
}
