//! The dispatch protocol handler.
//!
//! [`ContextDispatcher`] implements every operation of the RPC surface on
//! top of the [`Registry`] and the capability adapters. The transport
//! layer delivers `(operationName, parameterBytes)` pairs, calls the
//! matching method here, and sends back the serialized result or error.
//!
//! # Session lifecycle
//!
//! A session moves `Unestablished -> Initialized` exactly once:
//! `initialize` is the only valid first call, any other operation before
//! it fails with [`Error::NotInitialized`], and a second `initialize`
//! fails with [`Error::AlreadyInitialized`]. There is no terminal state;
//! the session ends when the transport disconnects.
//!
//! # Concurrency
//!
//! Operations may overlap freely. Registry lookups complete and release
//! their lock before any handler future is awaited, so a suspended
//! handler never blocks other calls. Every operation is a plain async fn:
//! dropping its future at any await point aborts the call, which is how
//! an external timeout cancels a stuck handler.

use crate::registry::Registry;
use crate::subscription::{ResourceUpdated, SubscriptionSet};
use ctxkit_core::{
    CapabilityConfig, CapabilityKind, ClientInfo, Error, InitializeRequest, InitializeResponse,
    ListResponse, LoggingLevel, PromptDescriptor, RequestOptions, ResourceContentData,
    ResourceDescriptor, Result, ServerInfo, ToolDescriptor,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;

/// Operation names as they appear on the wire.
pub mod methods {
    /// Establish the session and negotiate capabilities.
    pub const INITIALIZE: &str = "initialize";
    /// Liveness check.
    pub const PING: &str = "ping";
    /// Derive a completion string from the input.
    pub const COMPLETE: &str = "complete";
    /// Set the minimum diagnostic severity.
    pub const SET_LOGGING_LEVEL: &str = "setLoggingLevel";
    /// Generate a prompt from a registered template.
    pub const GET_PROMPT: &str = "getPrompt";
    /// List registered prompts.
    pub const LIST_PROMPTS: &str = "listPrompts";
    /// List registered resources.
    pub const LIST_RESOURCES: &str = "listResources";
    /// Read a resource by URI.
    pub const READ_RESOURCE: &str = "readResource";
    /// Subscribe to change events for a resource URI.
    pub const SUBSCRIBE_RESOURCE: &str = "subscribeResource";
    /// Drop a resource subscription.
    pub const UNSUBSCRIBE_RESOURCE: &str = "unsubscribeResource";
    /// Invoke a registered tool.
    pub const CALL_TOOL: &str = "callTool";
    /// List registered tools.
    pub const LIST_TOOLS: &str = "listTools";
    /// Acknowledge a roots-list-changed notification.
    pub const SEND_ROOTS_LIST_CHANGED: &str = "sendRootsListChanged";
}

/// Parameters for [`ContextDispatcher::get_prompt`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetPromptParams {
    /// Name of the registered prompt.
    pub name: String,
    /// Arguments forwarded to the prompt's handler.
    #[serde(default)]
    pub arguments: Value,
}

/// The dispatch protocol handler for one connected session.
///
/// `Debug` output summarizes session state and registry counts; the
/// capability maps themselves hold `dyn` handlers and are not printable.
pub struct ContextDispatcher {
    registry: Arc<Registry>,
    server_info: ServerInfo,
    instructions: Option<String>,
    capabilities: BTreeMap<String, CapabilityConfig>,
    initialized: AtomicBool,
    client_info: RwLock<Option<ClientInfo>>,
    logging_level: RwLock<LoggingLevel>,
    subscriptions: SubscriptionSet,
}

impl ContextDispatcher {
    /// Create a dispatcher over a registry.
    ///
    /// The advertised capability map is derived from what the registry
    /// actually holds: a category appears only when at least one
    /// capability of that kind is registered.
    #[must_use]
    pub fn new(server_info: ServerInfo, registry: Arc<Registry>) -> Self {
        let capabilities = advertised_capabilities(&registry);
        Self {
            registry,
            server_info,
            instructions: None,
            capabilities,
            initialized: AtomicBool::new(false),
            client_info: RwLock::new(None),
            logging_level: RwLock::new(LoggingLevel::default()),
            subscriptions: SubscriptionSet::new(),
        }
    }

    /// Attach human-readable usage instructions to the handshake response.
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// The server identity sent during the handshake.
    #[must_use]
    pub fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// The registry backing this dispatcher.
    #[must_use]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Whether the handshake has completed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// The client identity stored at handshake time.
    #[must_use]
    pub fn client_info(&self) -> Option<ClientInfo> {
        self.client_info
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The session's current minimum diagnostic severity.
    #[must_use]
    pub fn logging_level(&self) -> LoggingLevel {
        *self
            .logging_level
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether an event at `level` passes the session's minimum severity.
    #[must_use]
    pub fn log_enabled(&self, level: LoggingLevel) -> bool {
        level >= self.logging_level()
    }

    /// Establish the session.
    ///
    /// Stores the client identity and returns the server identity, the
    /// advertised capability configuration, and optional instructions.
    /// A second call on the same session is rejected.
    pub async fn initialize(
        &self,
        request: InitializeRequest,
        options: Option<RequestOptions>,
    ) -> Result<InitializeResponse> {
        self.note_options(methods::INITIALIZE, options);
        if self
            .initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::AlreadyInitialized);
        }

        if self.log_enabled(LoggingLevel::Info) {
            tracing::info!(
                client = %request.client_info.name,
                version = %request.client_info.version,
                "session initialized"
            );
        }
        *self
            .client_info
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(request.client_info);

        let mut response =
            InitializeResponse::new(self.server_info.clone(), self.capabilities.clone());
        if let Some(instructions) = &self.instructions {
            response = response.instructions(instructions.clone());
        }
        Ok(response)
    }

    /// Liveness check.
    pub async fn ping(&self, options: Option<RequestOptions>) -> Result<&'static str> {
        self.note_options(methods::PING, options);
        self.ensure_initialized(methods::PING)?;
        Ok("pong")
    }

    /// Derive a completion string from the UTF-8 input.
    pub async fn complete(
        &self,
        params: &[u8],
        options: Option<RequestOptions>,
    ) -> Result<String> {
        self.note_options(methods::COMPLETE, options);
        self.ensure_initialized(methods::COMPLETE)?;
        let input =
            std::str::from_utf8(params).map_err(|err| Error::decode(methods::COMPLETE, err))?;
        Ok(format!("completed: {input}"))
    }

    /// Set the session's minimum diagnostic severity.
    ///
    /// Dispatcher trace events below the stored level are suppressed
    /// from then on.
    pub async fn set_logging_level(
        &self,
        level: LoggingLevel,
        options: Option<RequestOptions>,
    ) -> Result<()> {
        self.note_options(methods::SET_LOGGING_LEVEL, options);
        self.ensure_initialized(methods::SET_LOGGING_LEVEL)?;
        *self
            .logging_level
            .write()
            .unwrap_or_else(PoisonError::into_inner) = level;
        if self.log_enabled(LoggingLevel::Debug) {
            tracing::debug!(%level, "logging level set");
        }
        Ok(())
    }

    /// Generate a prompt by dispatching to the registered template.
    pub async fn get_prompt(
        &self,
        params: &[u8],
        options: Option<RequestOptions>,
    ) -> Result<String> {
        self.note_options(methods::GET_PROMPT, options);
        self.ensure_initialized(methods::GET_PROMPT)?;
        let params: GetPromptParams = serde_json::from_slice(params)
            .map_err(|err| Error::decode(methods::GET_PROMPT, err))?;

        let prompt = self
            .registry
            .prompt(&params.name)
            .ok_or_else(|| Error::not_found(CapabilityKind::Prompt, &params.name))?;
        let arguments = serde_json::to_vec(&params.arguments)
            .map_err(|err| Error::decode(methods::GET_PROMPT, err))?;

        if self.log_enabled(LoggingLevel::Debug) {
            tracing::debug!(prompt = %params.name, "generating prompt");
        }
        prompt.invoke(&arguments).await
    }

    /// List every registered prompt. Never paginates; `next` is absent.
    pub async fn list_prompts(
        &self,
        options: Option<RequestOptions>,
    ) -> Result<ListResponse<PromptDescriptor>> {
        self.note_options(methods::LIST_PROMPTS, options);
        self.ensure_initialized(methods::LIST_PROMPTS)?;
        Ok(ListResponse::new(self.registry.prompts()))
    }

    /// List every registered resource. Never paginates; `next` is absent.
    pub async fn list_resources(
        &self,
        options: Option<RequestOptions>,
    ) -> Result<ListResponse<ResourceDescriptor>> {
        self.note_options(methods::LIST_RESOURCES, options);
        self.ensure_initialized(methods::LIST_RESOURCES)?;
        Ok(ListResponse::new(self.registry.resources()))
    }

    /// List every registered tool. Never paginates; `next` is absent.
    pub async fn list_tools(
        &self,
        options: Option<RequestOptions>,
    ) -> Result<ListResponse<ToolDescriptor>> {
        self.note_options(methods::LIST_TOOLS, options);
        self.ensure_initialized(methods::LIST_TOOLS)?;
        Ok(ListResponse::new(self.registry.tools()))
    }

    /// Read the resource whose URI matches `uri` exactly.
    pub async fn read_resource(
        &self,
        uri: &str,
        options: Option<RequestOptions>,
    ) -> Result<ResourceContentData> {
        self.note_options(methods::READ_RESOURCE, options);
        self.ensure_initialized(methods::READ_RESOURCE)?;
        let resource = self
            .registry
            .resource_by_uri(uri)
            .ok_or_else(|| Error::not_found(CapabilityKind::Resource, uri))?;

        // Lookup is done and the lock released; the read may suspend.
        if self.log_enabled(LoggingLevel::Debug) {
            tracing::debug!(%uri, "reading resource");
        }
        resource.read().await
    }

    /// Subscribe to change events for a registered resource URI.
    pub async fn subscribe_resource(
        &self,
        uri: &str,
        options: Option<RequestOptions>,
    ) -> Result<()> {
        self.note_options(methods::SUBSCRIBE_RESOURCE, options);
        self.ensure_initialized(methods::SUBSCRIBE_RESOURCE)?;
        if self.registry.resource_by_uri(uri).is_none() {
            return Err(Error::not_found(CapabilityKind::Resource, uri));
        }
        self.subscriptions.subscribe(uri);
        if self.log_enabled(LoggingLevel::Debug) {
            tracing::debug!(%uri, "subscribed to resource");
        }
        Ok(())
    }

    /// Drop a resource subscription. Unsubscribing a URI that was never
    /// subscribed is an accepted no-op.
    pub async fn unsubscribe_resource(
        &self,
        uri: &str,
        options: Option<RequestOptions>,
    ) -> Result<()> {
        self.note_options(methods::UNSUBSCRIBE_RESOURCE, options);
        self.ensure_initialized(methods::UNSUBSCRIBE_RESOURCE)?;
        self.subscriptions.unsubscribe(uri);
        if self.log_enabled(LoggingLevel::Debug) {
            tracing::debug!(%uri, "unsubscribed from resource");
        }
        Ok(())
    }

    /// Invoke a registered tool with raw parameter bytes.
    pub async fn call_tool(
        &self,
        name: &str,
        params: &[u8],
        options: Option<RequestOptions>,
    ) -> Result<String> {
        self.note_options(methods::CALL_TOOL, options);
        self.ensure_initialized(methods::CALL_TOOL)?;
        let tool = self
            .registry
            .tool(name)
            .ok_or_else(|| Error::not_found(CapabilityKind::Tool, name))?;

        if self.log_enabled(LoggingLevel::Debug) {
            tracing::debug!(tool = %name, "calling tool");
        }
        match tool.invoke(params).await {
            Ok(output) => Ok(output),
            Err(err) => {
                if self.log_enabled(LoggingLevel::Warning) {
                    tracing::warn!(tool = %name, error = %err, "tool call failed");
                }
                Err(err)
            }
        }
    }

    /// Acknowledge a roots-list-changed notification.
    pub async fn send_roots_list_changed(&self, options: Option<RequestOptions>) -> Result<()> {
        self.note_options(methods::SEND_ROOTS_LIST_CHANGED, options);
        self.ensure_initialized(methods::SEND_ROOTS_LIST_CHANGED)?;
        if self.log_enabled(LoggingLevel::Debug) {
            tracing::debug!("roots list changed");
        }
        Ok(())
    }

    /// Install a watcher for resource-change events.
    ///
    /// The transport drains this receiver and forwards each event to the
    /// remote peer as a resource-updated notification.
    pub fn watch_resource_updates(&self) -> mpsc::UnboundedReceiver<ResourceUpdated> {
        self.subscriptions.watch()
    }

    /// Report that a resource's content changed.
    ///
    /// Called by the host side that owns the underlying data. The event
    /// reaches the watcher only if the session subscribed to `uri`;
    /// returns whether it was delivered.
    pub fn notify_resource_updated(&self, uri: &str) -> bool {
        self.subscriptions.notify(uri)
    }

    fn ensure_initialized(&self, method: &str) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(Error::not_initialized(method))
        }
    }

    fn note_options(&self, method: &str, options: Option<RequestOptions>) {
        let Some(timeout) = options.and_then(|o| o.timeout) else {
            return;
        };
        // Advisory only; enforcement is the transport's responsibility.
        if self.log_enabled(LoggingLevel::Debug) {
            tracing::trace!(method, timeout, "advisory timeout supplied");
        }
    }
}

impl fmt::Debug for ContextDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextDispatcher")
            .field("server_info", &self.server_info)
            .field("initialized", &self.is_initialized())
            .field("logging_level", &self.logging_level())
            .field("tools", &self.registry.tool_count())
            .field("resources", &self.registry.resource_count())
            .field("prompts", &self.registry.prompt_count())
            .finish_non_exhaustive()
    }
}

/// Derive the handshake capability map from registry contents.
fn advertised_capabilities(registry: &Registry) -> BTreeMap<String, CapabilityConfig> {
    let mut capabilities = BTreeMap::new();
    if registry.tool_count() > 0 {
        capabilities.insert(
            "tools".to_string(),
            CapabilityConfig::new()
                .setting("call", "true")
                .setting("list", "true"),
        );
    }
    if registry.resource_count() > 0 {
        capabilities.insert(
            "resources".to_string(),
            CapabilityConfig::new()
                .setting("read", "true")
                .setting("subscribe", "true"),
        );
    }
    if registry.prompt_count() > 0 {
        capabilities.insert(
            "prompts".to_string(),
            CapabilityConfig::new()
                .setting("execute", "true")
                .setting("list", "true"),
        );
    }
    capabilities
}
