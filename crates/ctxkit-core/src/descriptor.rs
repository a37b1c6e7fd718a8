//! Capability descriptors.
//!
//! Descriptors are the metadata projections of registered capabilities,
//! returned by the listing operations. Schema values are opaque
//! [`serde_json::Value`]s attached by a schema provider; this core never
//! inspects them.

use crate::listing::Identified;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata projection of a registered tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique name within the tool namespace.
    pub name: String,
    /// What the tool does.
    pub description: String,
    /// Opaque schema describing the input shape.
    #[serde(rename = "inputSchema", skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
    /// Free-text usage guide.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guide: Option<String>,
}

impl ToolDescriptor {
    /// Create a descriptor with a name and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: None,
            guide: None,
        }
    }

    /// Attach an input schema.
    #[must_use]
    pub fn input_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }

    /// Attach a usage guide.
    #[must_use]
    pub fn guide(mut self, guide: impl Into<String>) -> Self {
        self.guide = Some(guide.into());
        self
    }
}

impl Identified for ToolDescriptor {
    type Id = String;

    fn identity(&self) -> String {
        self.name.clone()
    }
}

/// Metadata projection of a registered prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDescriptor {
    /// Unique name within the prompt namespace.
    pub name: String,
    /// What the prompt generates.
    pub description: String,
    /// Opaque schema describing the prompt parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    /// Free-text usage guide.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guide: Option<String>,
}

impl PromptDescriptor {
    /// Create a descriptor with a name and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: None,
            guide: None,
        }
    }

    /// Attach a parameter schema.
    #[must_use]
    pub fn parameters(mut self, schema: Value) -> Self {
        self.parameters = Some(schema);
        self
    }

    /// Attach a usage guide.
    #[must_use]
    pub fn guide(mut self, guide: impl Into<String>) -> Self {
        self.guide = Some(guide.into());
        self
    }
}

impl Identified for PromptDescriptor {
    type Id = String;

    fn identity(&self) -> String {
        self.name.clone()
    }
}

/// Metadata projection of a registered resource.
///
/// Resource identity is the `name:uri` pair: two resources may share a
/// name with different URIs, but not the same name and URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// The URI identifying the resource.
    pub uri: String,
    /// Human-readable name.
    pub name: String,
    /// What the resource contains.
    pub description: String,
    /// MIME type of the content, if known.
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl ResourceDescriptor {
    /// Create a descriptor with a URI, name, and description.
    pub fn new(
        uri: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            description: description.into(),
            mime_type: None,
        }
    }

    /// Set the MIME type.
    #[must_use]
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

impl Identified for ResourceDescriptor {
    type Id = String;

    fn identity(&self) -> String {
        format!("{}:{}", self.name, self.uri)
    }
}
