//! Resource content values.
//!
//! [`ResourceContentData`] is the tagged text/binary union returned by
//! `readResource`. The wire encoding keeps an explicit discriminator
//! (`{"type": "text" | "binary", "value": ...}`) so a text string and
//! binary bytes of the same content are never conflated; binary payloads
//! cross the wire base64-encoded.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Content read from a resource: exactly one variant is populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceContentData {
    /// UTF-8 text content.
    Text(String),
    /// Raw binary content.
    Binary(Vec<u8>),
}

impl ResourceContentData {
    /// Text content.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Binary content.
    pub fn binary(value: impl Into<Vec<u8>>) -> Self {
        Self::Binary(value.into())
    }

    /// Whether this is the text variant.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// The text content, if this is the text variant.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }

    /// The raw bytes, if this is the binary variant.
    #[must_use]
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Self::Text(_) => None,
            Self::Binary(bytes) => Some(bytes),
        }
    }
}

/// Text renders verbatim; binary renders as base64.
impl fmt::Display for ResourceContentData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Binary(bytes) => f.write_str(&BASE64.encode(bytes)),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
enum WireRef<'a> {
    Text(&'a str),
    Binary(String),
}

#[derive(Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
enum Wire {
    Text(String),
    Binary(String),
}

impl Serialize for ResourceContentData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            Self::Text(text) => WireRef::Text(text),
            Self::Binary(bytes) => WireRef::Binary(BASE64.encode(bytes)),
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ResourceContentData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Wire::deserialize(deserializer)? {
            Wire::Text(text) => Ok(Self::Text(text)),
            Wire::Binary(encoded) => BASE64
                .decode(&encoded)
                .map(Self::Binary)
                .map_err(D::Error::custom),
        }
    }
}

/// The fixed input shape handed to every resource handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReference {
    /// The URI identifying the resource.
    pub uri: String,
    /// Expected MIME type, if the registration declared one.
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl ResourceReference {
    /// Create a reference to a URI.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            mime_type: None,
        }
    }

    /// Set the expected MIME type.
    #[must_use]
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}
