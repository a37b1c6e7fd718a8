//! The capability registry.
//!
//! Three independent name-keyed collections, one per capability kind.
//! Registration refuses duplicates; lookups return `Arc` clones so no
//! lock guard is ever held across a handler invocation.
//!
//! Tools and prompts key by name. Resources key by the `name:uri`
//! identity pair, so two resources may share a name with different URIs.

use crate::adapter::{PromptCapability, ResourceCapability, ToolCapability};
use ctxkit_core::{
    CapabilityKind, Error, PromptDescriptor, ResourceDescriptor, Result, ToolDescriptor,
};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Name-keyed store of registered capabilities.
///
/// Reads (lookup, listing) run concurrently; registration serializes
/// against reads and other writes per namespace. Entries are immutable
/// for their lifetime: there is no update-in-place and no removal short
/// of dropping the registry.
#[derive(Default)]
pub struct Registry {
    tools: RwLock<HashMap<String, Arc<dyn ToolCapability>>>,
    resources: RwLock<HashMap<String, Arc<dyn ResourceCapability>>>,
    prompts: RwLock<HashMap<String, Arc<dyn PromptCapability>>>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    ///
    /// Fails with [`Error::RegistrationConflict`] if a tool with the same
    /// name already exists; the first registration is retained.
    pub fn register_tool(&self, tool: Arc<dyn ToolCapability>) -> Result<()> {
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        let name = tool.name().to_string();
        if tools.contains_key(&name) {
            return Err(Error::conflict(CapabilityKind::Tool, name));
        }
        tools.insert(name, tool);
        Ok(())
    }

    /// Register a resource, keyed by its `name:uri` identity.
    pub fn register_resource(&self, resource: Arc<dyn ResourceCapability>) -> Result<()> {
        let mut resources = self
            .resources
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let identity = resource.identity();
        if resources.contains_key(&identity) {
            return Err(Error::conflict(CapabilityKind::Resource, identity));
        }
        resources.insert(identity, resource);
        Ok(())
    }

    /// Register a prompt.
    pub fn register_prompt(&self, prompt: Arc<dyn PromptCapability>) -> Result<()> {
        let mut prompts = self
            .prompts
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let name = prompt.name().to_string();
        if prompts.contains_key(&name) {
            return Err(Error::conflict(CapabilityKind::Prompt, name));
        }
        prompts.insert(name, prompt);
        Ok(())
    }

    /// Look up a tool by name.
    #[must_use]
    pub fn tool(&self, name: &str) -> Option<Arc<dyn ToolCapability>> {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Look up a prompt by name.
    #[must_use]
    pub fn prompt(&self, name: &str) -> Option<Arc<dyn PromptCapability>> {
        self.prompts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Look up a resource whose URI matches `uri` exactly.
    ///
    /// Near-misses (trailing slash, case difference) do not match.
    #[must_use]
    pub fn resource_by_uri(&self, uri: &str) -> Option<Arc<dyn ResourceCapability>> {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .find(|resource| resource.uri() == uri)
            .cloned()
    }

    /// Snapshot of every tool descriptor. Ordering is unspecified.
    #[must_use]
    pub fn tools(&self) -> Vec<ToolDescriptor> {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|tool| tool.describe())
            .collect()
    }

    /// Snapshot of every resource descriptor. Ordering is unspecified.
    #[must_use]
    pub fn resources(&self) -> Vec<ResourceDescriptor> {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|resource| resource.describe())
            .collect()
    }

    /// Snapshot of every prompt descriptor. Ordering is unspecified.
    #[must_use]
    pub fn prompts(&self) -> Vec<PromptDescriptor> {
        self.prompts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|prompt| prompt.describe())
            .collect()
    }

    /// Number of registered tools.
    #[must_use]
    pub fn tool_count(&self) -> usize {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of registered resources.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of registered prompts.
    #[must_use]
    pub fn prompt_count(&self) -> usize {
        self.prompts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is registered in any namespace.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tool_count() == 0 && self.resource_count() == 0 && self.prompt_count() == 0
    }
}
