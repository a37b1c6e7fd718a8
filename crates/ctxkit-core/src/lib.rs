//! # ctxkit-core
//!
//! Wire types and errors for the ctxkit capability exchange protocol.
//!
//! A ctxkit host exposes named **tools** (invokable actions),
//! **resources** (addressable content sources), and **prompts**
//! (parameterized text templates) through one uniform remote surface.
//! This crate holds the value types every peer speaks:
//!
//! - **Envelope & content types**: [`Envelope`], [`ResourceContentData`],
//!   [`ListResponse`]
//! - **Descriptors**: [`ToolDescriptor`], [`ResourceDescriptor`],
//!   [`PromptDescriptor`]
//! - **Handshake**: [`InitializeRequest`], [`InitializeResponse`],
//!   [`CapabilityConfig`], [`ServerInfo`], [`ClientInfo`]
//! - **Error handling**: the unified [`Error`] type
//!
//! This crate is runtime-agnostic and transport-agnostic: everything here
//! round-trips through JSON, and schema values stay opaque
//! [`serde_json::Value`]s that are never inspected.
//!
//! The registry, adapters, and dispatch handler live in `ctxkit-server`.

#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_name_repetitions)]

pub mod capability;
pub mod content;
pub mod descriptor;
pub mod envelope;
pub mod error;
pub mod listing;
pub mod logging;
pub mod options;

pub use capability::{
    CapabilityConfig, ClientInfo, InitializeRequest, InitializeResponse, PROTOCOL_VERSION,
    ServerInfo,
};
pub use content::{ResourceContentData, ResourceReference};
pub use descriptor::{PromptDescriptor, ResourceDescriptor, ToolDescriptor};
pub use envelope::Envelope;
pub use error::{CapabilityKind, Error, ErrorKind, Result};
pub use listing::{Identified, ListResponse};
pub use logging::LoggingLevel;
pub use options::RequestOptions;
