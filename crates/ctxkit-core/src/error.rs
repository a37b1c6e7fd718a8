//! Unified error handling for the capability exchange core.
//!
//! Every failure a dispatch operation can report flows through a single
//! [`Error`] type. Each variant carries a machine-checkable kind plus the
//! context a caller needs to diagnose the failure (capability name,
//! offending identity, underlying message) without leaking internal state.
//!
//! Recoverable failures (decode, not-found, handler) are returned as values
//! from dispatch operations and never take down a session. Only
//! [`Error::RegistrationConflict`] is expected to abort anything, and even
//! that is a returned value: the startup sequence decides whether to halt.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Convenience alias used throughout the workspace.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The three independent capability namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    /// An invokable action with typed input and displayable output.
    Tool,
    /// An addressable content source identified by URI.
    Resource,
    /// A parameterized text-template generator.
    Prompt,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tool => write!(f, "tool"),
            Self::Resource => write!(f, "resource"),
            Self::Prompt => write!(f, "prompt"),
        }
    }
}

/// Classification of an [`Error`], for callers that branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Duplicate identity within one capability namespace.
    RegistrationConflict,
    /// An operation was called before `initialize` completed.
    NotInitialized,
    /// `initialize` was called twice on the same session.
    AlreadyInitialized,
    /// No registry entry matches the referenced name or URI.
    NotFound,
    /// Parameter bytes did not match the target handler's input shape.
    Decode,
    /// The wrapped user handler reported a failure.
    Handler,
}

/// The error type for registry and dispatch operations.
#[derive(Error, Debug)]
pub enum Error {
    /// An entry with the same identity already exists in the namespace.
    ///
    /// Two handler authors collided on a name. This is a configuration
    /// error surfaced at startup; the first registration is retained.
    #[error("{kind} '{identity}' is already registered")]
    RegistrationConflict {
        /// The namespace in which the collision occurred.
        kind: CapabilityKind,
        /// The identity that was registered twice.
        identity: String,
    },

    /// An operation was invoked before the session handshake.
    #[error("'{method}' called before initialize")]
    NotInitialized {
        /// The operation that was attempted.
        method: String,
    },

    /// `initialize` was called on an already-initialized session.
    #[error("session is already initialized")]
    AlreadyInitialized,

    /// The referenced capability does not exist.
    #[error("{kind} '{identity}' not found")]
    NotFound {
        /// The namespace that was searched.
        kind: CapabilityKind,
        /// The name or URI that had no match.
        identity: String,
    },

    /// Parameter bytes could not be decoded into the handler's input type.
    #[error("[{capability}] invalid parameters: {message}")]
    Decode {
        /// The capability (or operation) whose parameters were malformed.
        capability: String,
        /// Description of the decode failure.
        message: String,
    },

    /// The wrapped handler itself failed.
    #[error("[{capability}] handler failed: {message}")]
    Handler {
        /// The capability whose handler failed.
        capability: String,
        /// The handler's failure description.
        message: String,
    },
}

impl Error {
    /// A duplicate-identity registration.
    pub fn conflict(kind: CapabilityKind, identity: impl Into<String>) -> Self {
        Self::RegistrationConflict {
            kind,
            identity: identity.into(),
        }
    }

    /// An operation attempted before `initialize`.
    pub fn not_initialized(method: impl Into<String>) -> Self {
        Self::NotInitialized {
            method: method.into(),
        }
    }

    /// A name or URI with no matching registry entry.
    pub fn not_found(kind: CapabilityKind, identity: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            identity: identity.into(),
        }
    }

    /// A parameter decode failure tied to a capability name.
    pub fn decode(capability: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Decode {
            capability: capability.into(),
            message: message.to_string(),
        }
    }

    /// A handler execution failure tied to a capability name.
    pub fn handler(capability: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Handler {
            capability: capability.into(),
            message: message.to_string(),
        }
    }

    /// The machine-checkable kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::RegistrationConflict { .. } => ErrorKind::RegistrationConflict,
            Self::NotInitialized { .. } => ErrorKind::NotInitialized,
            Self::AlreadyInitialized => ErrorKind::AlreadyInitialized,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Handler { .. } => ErrorKind::Handler,
        }
    }

    /// Whether this error means "doesn't exist" as opposed to "malformed".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_carries_capability_context() {
        let err = Error::handler("echo", "division by zero");
        assert_eq!(err.to_string(), "[echo] handler failed: division by zero");

        let err = Error::not_found(CapabilityKind::Tool, "missing");
        assert_eq!(err.to_string(), "tool 'missing' not found");
    }

    #[test]
    fn kind_distinguishes_not_found_from_decode() {
        let not_found = Error::not_found(CapabilityKind::Resource, "db://x");
        let decode = Error::decode("db://x", "expected string");

        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        assert_eq!(decode.kind(), ErrorKind::Decode);
        assert!(not_found.is_not_found());
        assert!(!decode.is_not_found());
    }

    #[test]
    fn conflict_names_the_namespace() {
        let err = Error::conflict(CapabilityKind::Prompt, "greet");
        assert_eq!(err.to_string(), "prompt 'greet' is already registered");
        assert_eq!(err.kind(), ErrorKind::RegistrationConflict);
    }
}
