//! Handshake and capability-negotiation types.
//!
//! The handshake exchanges peer identities and a capability configuration
//! map: each side advertises, per capability category (`"tools"`,
//! `"resources"`, `"prompts"`), which operations it supports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The protocol version advertised in the handshake response.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Immutable server identity exchanged once at handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl ServerInfo {
    /// Create new server info.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Immutable client identity exchanged once at handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    pub version: String,
}

impl ClientInfo {
    /// Create new client info.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Per-category capability settings advertised during the handshake.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityConfig {
    /// Operation name to setting value (e.g. `"call" -> "true"`).
    pub settings: BTreeMap<String, String>,
}

impl CapabilityConfig {
    /// Empty configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            settings: BTreeMap::new(),
        }
    }

    /// Add a setting.
    #[must_use]
    pub fn setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Whether an operation is advertised with the value `"true"`.
    #[must_use]
    pub fn supports(&self, operation: &str) -> bool {
        self.settings.get(operation).is_some_and(|v| v == "true")
    }
}

/// The `initialize` request payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeRequest {
    /// Identity of the connecting client.
    #[serde(rename = "clientInfo")]
    pub client_info: ClientInfo,
    /// Capability configuration requested by the client.
    pub capabilities: BTreeMap<String, CapabilityConfig>,
}

impl InitializeRequest {
    /// Create an initialize request.
    #[must_use]
    pub const fn new(
        client_info: ClientInfo,
        capabilities: BTreeMap<String, CapabilityConfig>,
    ) -> Self {
        Self {
            client_info,
            capabilities,
        }
    }
}

/// The `initialize` response payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeResponse {
    /// Protocol version the server speaks.
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Identity of the server.
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
    /// Capability configuration advertised by the server.
    pub capabilities: BTreeMap<String, CapabilityConfig>,
    /// Optional human-readable usage instructions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl InitializeResponse {
    /// Create a response advertising [`PROTOCOL_VERSION`].
    #[must_use]
    pub fn new(server_info: ServerInfo, capabilities: BTreeMap<String, CapabilityConfig>) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            server_info,
            capabilities,
            instructions: None,
        }
    }

    /// Attach usage instructions.
    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn capability_config_supports() {
        let config = CapabilityConfig::new()
            .setting("call", "true")
            .setting("list", "false");

        assert!(config.supports("call"));
        assert!(!config.supports("list"));
        assert!(!config.supports("subscribe"));
    }

    #[test]
    fn handshake_wire_names() {
        let request = InitializeRequest::new(
            ClientInfo::new("test-client", "0.1.0"),
            BTreeMap::from([(
                "tools".to_string(),
                CapabilityConfig::new().setting("call", "true"),
            )]),
        );
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"clientInfo\""));

        let back: InitializeRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn response_carries_protocol_version() {
        let response =
            InitializeResponse::new(ServerInfo::new("srv", "1.0"), BTreeMap::new())
                .instructions("Welcome");

        assert_eq!(response.protocol_version, PROTOCOL_VERSION);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"protocolVersion\":\"1.0\""));
        assert!(json.contains("\"serverInfo\""));
    }
}
