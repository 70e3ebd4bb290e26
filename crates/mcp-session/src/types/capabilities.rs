//! MCP capability and initialization types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const MCP_VERSION: &str = "2024-11-05";

/// Name and version of either side of the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Implementation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// The server identity advertised in the handshake. Fixed once the session is built.
pub type ServerIdentity = Implementation;

impl Implementation {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Feature name to descriptor, advertised verbatim during `initialize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(Map<String, Value>);

impl CapabilitySet {
    pub fn empty() -> Self {
        Self(Map::new())
    }

    /// Add or replace one feature descriptor.
    pub fn with(mut self, feature: impl Into<String>, descriptor: Value) -> Self {
        self.0.insert(feature.into(), descriptor);
        self
    }

    pub fn get(&self, feature: &str) -> Option<&Value> {
        self.0.get(feature)
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl Default for CapabilitySet {
    fn default() -> Self {
        Self::empty()
            .with("resources", json!({ "listChanged": true }))
            .with("tools", json!({ "listChanged": true }))
            .with("prompts", json!({ "listChanged": true }))
            .with("logging", json!({}))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    #[serde(default)]
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: Map<String, Value>,
    #[serde(default)]
    pub client_info: Implementation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: CapabilitySet,
    pub server_info: ServerIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl InitializeResult {
    pub fn new(server_info: ServerIdentity, capabilities: CapabilitySet) -> Self {
        Self {
            protocol_version: MCP_VERSION.to_string(),
            capabilities,
            server_info,
            instructions: None,
        }
    }
}
