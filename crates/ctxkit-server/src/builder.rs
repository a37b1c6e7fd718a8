//! Fluent assembly of a dispatcher.
//!
//! [`ContextServerBuilder`] collects capabilities, registers them all at
//! build time, and produces a ready [`ContextDispatcher`]. Registration
//! conflicts surface from [`build`](ContextServerBuilder::build) instead
//! of panicking mid-setup.

use crate::adapter::{PromptCapability, ResourceCapability, ToolCapability};
use crate::dispatch::ContextDispatcher;
use crate::registry::Registry;
use ctxkit_core::{Result, ServerInfo};
use std::sync::Arc;

/// Builder for a [`ContextDispatcher`].
///
/// ```
/// use ctxkit_server::adapter::echo_tool;
/// use ctxkit_server::builder::ContextServerBuilder;
///
/// let dispatcher = ContextServerBuilder::new("demo-host", "0.1.0")
///     .instructions("Call `echo` to get your input back.")
///     .tool(echo_tool())
///     .build()
///     .unwrap();
/// assert_eq!(dispatcher.registry().tool_count(), 1);
/// ```
pub struct ContextServerBuilder {
    server_info: ServerInfo,
    instructions: Option<String>,
    tools: Vec<Arc<dyn ToolCapability>>,
    resources: Vec<Arc<dyn ResourceCapability>>,
    prompts: Vec<Arc<dyn PromptCapability>>,
}

impl ContextServerBuilder {
    /// Start a builder with the server identity.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            server_info: ServerInfo::new(name, version),
            instructions: None,
            tools: Vec::new(),
            resources: Vec::new(),
            prompts: Vec::new(),
        }
    }

    /// Attach usage instructions sent in the handshake response.
    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Add a tool.
    #[must_use]
    pub fn tool(mut self, tool: impl ToolCapability + 'static) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    /// Add a resource.
    #[must_use]
    pub fn resource(mut self, resource: impl ResourceCapability + 'static) -> Self {
        self.resources.push(Arc::new(resource));
        self
    }

    /// Add a prompt.
    #[must_use]
    pub fn prompt(mut self, prompt: impl PromptCapability + 'static) -> Self {
        self.prompts.push(Arc::new(prompt));
        self
    }

    /// Register everything and produce the dispatcher.
    ///
    /// Fails on the first registration conflict; earlier registrations
    /// are discarded along with the partially built registry.
    pub fn build(self) -> Result<ContextDispatcher> {
        let registry = Arc::new(Registry::new());
        for tool in self.tools {
            registry.register_tool(tool)?;
        }
        for resource in self.resources {
            registry.register_resource(resource)?;
        }
        for prompt in self.prompts {
            registry.register_prompt(prompt)?;
        }

        let mut dispatcher = ContextDispatcher::new(self.server_info, registry);
        if let Some(instructions) = self.instructions {
            dispatcher = dispatcher.with_instructions(instructions);
        }
        Ok(dispatcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{ResourceFn, ToolFn, echo_tool};
    use ctxkit_core::{Envelope, ErrorKind, ResourceContentData};
    use std::convert::Infallible;

    #[test]
    fn build_registers_everything() {
        let dispatcher = ContextServerBuilder::new("host", "1.0.0")
            .tool(echo_tool())
            .resource(ResourceFn::new(
                "motd",
                "mem://motd",
                "Message of the day",
                |_| async { Ok::<_, Infallible>(ResourceContentData::text("hello")) },
            ))
            .build()
            .unwrap();

        assert_eq!(dispatcher.registry().tool_count(), 1);
        assert_eq!(dispatcher.registry().resource_count(), 1);
        assert_eq!(dispatcher.registry().prompt_count(), 0);
    }

    #[test]
    fn conflicting_tools_fail_the_build() {
        let duplicate = ToolFn::new("echo", "another echo", |input: Envelope<String>| {
            async move { Ok::<_, Infallible>(input.data) }
        });
        let err = ContextServerBuilder::new("host", "1.0.0")
            .tool(echo_tool())
            .tool(duplicate)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RegistrationConflict);
    }
}
