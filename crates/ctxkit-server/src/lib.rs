//! # ctxkit-server
//!
//! Host-side runtime for the ctxkit capability exchange protocol: the
//! capability registry, the typed-to-dynamic adapters, and the dispatch
//! handler the transport layer drives.
//!
//! - **Adapters**: [`ToolFn`], [`PromptFn`], [`ResourceFn`] bind typed
//!   async handlers to the dynamically callable [`ToolCapability`],
//!   [`PromptCapability`], and [`ResourceCapability`] contracts
//! - **Registry**: [`Registry`] stores capabilities per namespace and
//!   refuses duplicate registration
//! - **Dispatch**: [`ContextDispatcher`] implements every protocol
//!   operation over one session, including the initialize handshake and
//!   resource subscriptions
//! - **Builder**: [`ContextServerBuilder`] assembles the above
//!
//! # Example
//!
//! ```
//! use ctxkit_server::{ContextServerBuilder, adapter::echo_tool};
//! use ctxkit_core::{ClientInfo, InitializeRequest};
//! use std::collections::BTreeMap;
//!
//! # tokio_test::block_on(async {
//! let dispatcher = ContextServerBuilder::new("demo-host", "0.1.0")
//!     .tool(echo_tool())
//!     .build()
//!     .unwrap();
//!
//! let request = InitializeRequest::new(ClientInfo::new("client", "0.1.0"), BTreeMap::new());
//! let response = dispatcher.initialize(request, None).await.unwrap();
//! assert!(response.capabilities.contains_key("tools"));
//!
//! let output = dispatcher.call_tool("echo", br#"{"data":"hi"}"#, None).await.unwrap();
//! assert_eq!(output, "hi");
//! # });
//! ```

#![deny(missing_docs)]

pub mod adapter;
pub mod builder;
pub mod dispatch;
pub mod registry;
pub mod subscription;

pub use adapter::{
    CapabilityFuture, PromptCapability, PromptFn, ResourceCapability, ResourceFn, ToolCapability,
    ToolFn, echo_tool,
};
pub use builder::ContextServerBuilder;
pub use dispatch::{ContextDispatcher, GetPromptParams};
pub use registry::Registry;
pub use subscription::{ResourceUpdated, SubscriptionSet};
