//! Capability adapters.
//!
//! An adapter binds a strongly typed handler function to one of the
//! uniform, dynamically callable capability contracts ([`ToolCapability`],
//! [`PromptCapability`], [`ResourceCapability`]). The concrete input and
//! output types are erased at the trait boundary but kept inside the
//! adapter's closure, where decode and encode stay type-safe.
//!
//! Adapters hold no mutable state and are freely shared across concurrent
//! invocations; any shared state lives inside the user-supplied handler
//! closure, and guarding it is that handler's contract.
//!
//! # Example
//!
//! ```
//! use ctxkit_server::adapter::{ToolCapability, ToolFn};
//! use ctxkit_core::Envelope;
//! use std::convert::Infallible;
//!
//! let tool = ToolFn::new("shout", "Uppercases the input", |input: Envelope<String>| {
//!     async move { Ok::<_, Infallible>(input.data.to_uppercase()) }
//! });
//!
//! # tokio_test::block_on(async {
//! let output = tool.invoke(br#"{"data":"hi"}"#).await.unwrap();
//! assert_eq!(output, "HI");
//! # });
//! ```

use ctxkit_core::{
    Envelope, Error, PromptDescriptor, ResourceContentData, ResourceDescriptor, ResourceReference,
    Result, ToolDescriptor,
};
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Display;
use std::future::Future;

/// The boxed future every dynamically dispatched capability returns.
pub type CapabilityFuture<T> = BoxFuture<'static, Result<T>>;

/// Boxed handler with the error already rendered to a message.
type BoxedHandler<I, O> =
    Box<dyn Fn(I) -> BoxFuture<'static, Result<O, String>> + Send + Sync>;

fn box_handler<I, O, F, Fut, E>(handler: F) -> BoxedHandler<I, O>
where
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, E>> + Send + 'static,
    E: Display,
{
    Box::new(move |input| {
        let fut = handler(input);
        Box::pin(async move { fut.await.map_err(|e| e.to_string()) })
    })
}

/// The uniform contract for an invokable tool.
pub trait ToolCapability: Send + Sync {
    /// Unique name within the tool namespace.
    fn name(&self) -> &str;

    /// The metadata projection exposed by `listTools`.
    fn describe(&self) -> ToolDescriptor;

    /// Decode `params`, run the handler, render the output.
    ///
    /// Decode failures and handler failures come back as error values
    /// tagged with the tool's name; nothing panics past this boundary.
    fn invoke(&self, params: &[u8]) -> CapabilityFuture<String>;
}

/// The uniform contract for a prompt generator.
pub trait PromptCapability: Send + Sync {
    /// Unique name within the prompt namespace.
    fn name(&self) -> &str;

    /// The metadata projection exposed by `listPrompts`.
    fn describe(&self) -> PromptDescriptor;

    /// Decode `params`, run the generator, render the prompt string.
    fn invoke(&self, params: &[u8]) -> CapabilityFuture<String>;
}

/// The uniform contract for an addressable content source.
///
/// Resources use a fixed shape instead of free type parameters: the input
/// is always a [`ResourceReference`] and the output is always
/// [`ResourceContentData`].
pub trait ResourceCapability: Send + Sync {
    /// Name of the resource (unique together with the URI).
    fn name(&self) -> &str;

    /// The URI identifying this resource.
    fn uri(&self) -> &str;

    /// The metadata projection exposed by `listResources`.
    fn describe(&self) -> ResourceDescriptor;

    /// Read the current content.
    fn read(&self) -> CapabilityFuture<ResourceContentData>;

    /// The `name:uri` identity pair.
    fn identity(&self) -> String {
        format!("{}:{}", self.name(), self.uri())
    }
}

/// A tool built from a typed handler function.
///
/// `I` is decoded from the parameter bytes as JSON; `O` is rendered to the
/// response string via [`Display`].
pub struct ToolFn<I, O> {
    name: String,
    description: String,
    input_schema: Option<Value>,
    guide: Option<String>,
    handler: BoxedHandler<I, O>,
}

impl<I, O> ToolFn<I, O> {
    /// Bind a handler under a name and description.
    pub fn new<F, Fut, E>(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: F,
    ) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, E>> + Send + 'static,
        E: Display,
    {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: None,
            guide: None,
            handler: box_handler(handler),
        }
    }

    /// Attach an opaque input schema.
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

impl<I, O> ToolCapability for ToolFn<I, O>
where
    I: DeserializeOwned + Send + 'static,
    O: Display + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn describe(&self) -> ToolDescriptor {
        let mut descriptor = ToolDescriptor::new(&self.name, &self.description);
        if let Some(schema) = &self.input_schema {
            descriptor = descriptor.input_schema(schema.clone());
        }
        if let Some(guide) = &self.guide {
            descriptor = descriptor.guide(guide.clone());
        }
        descriptor
    }

    fn invoke(&self, params: &[u8]) -> CapabilityFuture<String> {
        let input: I = match serde_json::from_slice(params) {
            Ok(input) => input,
            Err(err) => {
                let err = Error::decode(&self.name, err);
                return Box::pin(async move { Err(err) });
            }
        };
        let name = self.name.clone();
        let fut = (self.handler)(input);
        Box::pin(async move {
            match fut.await {
                Ok(output) => Ok(output.to_string()),
                Err(message) => Err(Error::handler(name, message)),
            }
        })
    }
}

/// A prompt generator built from a typed handler function.
pub struct PromptFn<I, O> {
    name: String,
    description: String,
    parameters: Option<Value>,
    guide: Option<String>,
    handler: BoxedHandler<I, O>,
}

impl<I, O> PromptFn<I, O> {
    /// Bind a generator under a name and description.
    pub fn new<F, Fut, E>(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: F,
    ) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, E>> + Send + 'static,
        E: Display,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: None,
            guide: None,
            handler: box_handler(handler),
        }
    }

    /// Attach an opaque parameter schema.
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

impl<I, O> PromptCapability for PromptFn<I, O>
where
    I: DeserializeOwned + Send + 'static,
    O: Display + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn describe(&self) -> PromptDescriptor {
        let mut descriptor = PromptDescriptor::new(&self.name, &self.description);
        if let Some(schema) = &self.parameters {
            descriptor = descriptor.parameters(schema.clone());
        }
        if let Some(guide) = &self.guide {
            descriptor = descriptor.guide(guide.clone());
        }
        descriptor
    }

    fn invoke(&self, params: &[u8]) -> CapabilityFuture<String> {
        let input: I = match serde_json::from_slice(params) {
            Ok(input) => input,
            Err(err) => {
                let err = Error::decode(&self.name, err);
                return Box::pin(async move { Err(err) });
            }
        };
        let name = self.name.clone();
        let fut = (self.handler)(input);
        Box::pin(async move {
            match fut.await {
                Ok(output) => Ok(output.to_string()),
                Err(message) => Err(Error::handler(name, message)),
            }
        })
    }
}

/// A resource built from a content-fetching handler.
pub struct ResourceFn {
    name: String,
    uri: String,
    mime_type: Option<String>,
    description: String,
    handler: Box<
        dyn Fn(ResourceReference) -> BoxFuture<'static, Result<ResourceContentData, String>>
            + Send
            + Sync,
    >,
}

impl ResourceFn {
    /// Bind a content handler under a name and URI.
    pub fn new<F, Fut, E>(
        name: impl Into<String>,
        uri: impl Into<String>,
        description: impl Into<String>,
        handler: F,
    ) -> Self
    where
        F: Fn(ResourceReference) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ResourceContentData, E>> + Send + 'static,
        E: Display,
    {
        Self {
            name: name.into(),
            uri: uri.into(),
            mime_type: None,
            description: description.into(),
            handler: box_handler(handler),
        }
    }

    /// Set the MIME type of the content.
    #[must_use]
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

impl ResourceCapability for ResourceFn {
    fn name(&self) -> &str {
        &self.name
    }

    fn uri(&self) -> &str {
        &self.uri
    }

    fn describe(&self) -> ResourceDescriptor {
        let mut descriptor = ResourceDescriptor::new(&self.uri, &self.name, &self.description);
        if let Some(mime_type) = &self.mime_type {
            descriptor = descriptor.mime_type(mime_type.clone());
        }
        descriptor
    }

    fn read(&self) -> CapabilityFuture<ResourceContentData> {
        let mut reference = ResourceReference::new(&self.uri);
        if let Some(mime_type) = &self.mime_type {
            reference = reference.mime_type(mime_type.clone());
        }
        let name = self.name.clone();
        let fut = (self.handler)(reference);
        Box::pin(async move { fut.await.map_err(|message| Error::handler(name, message)) })
    }
}

/// The stock echo tool: returns `Envelope { data }` input verbatim.
///
/// Used by tests and doc examples as the canonical minimal tool.
#[must_use]
pub fn echo_tool() -> ToolFn<Envelope<String>, String> {
    ToolFn::new(
        "echo",
        "A tool that echoes the provided input.",
        |input: Envelope<String>| async move { Ok::<_, std::convert::Infallible>(input.data) },
    )
    .input_schema(serde_json::json!({ "type": "string" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxkit_core::ErrorKind;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn echo_round_trip() {
        let tool = echo_tool();
        let output = tool.invoke(br#"{"data":"hi"}"#).await.unwrap();
        assert_eq!(output, "hi");
    }

    #[tokio::test]
    async fn decode_failure_names_the_tool() {
        let tool = echo_tool();
        let err = tool.invoke(b"not json").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.to_string().starts_with("[echo]"));
    }

    #[tokio::test]
    async fn handler_failure_names_the_tool() {
        let tool = ToolFn::new("fail", "Always fails", |_input: Envelope<String>| async {
            Err::<String, _>("boom")
        });
        let err = tool.invoke(br#"{"data":"x"}"#).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Handler);
        assert_eq!(err.to_string(), "[fail] handler failed: boom");
    }

    #[tokio::test]
    async fn prompt_renders_output() {
        let prompt = PromptFn::new(
            "greet",
            "Greeting template",
            |input: Envelope<String>| async move {
                Ok::<_, std::convert::Infallible>(format!("Hello, {}!", input.data))
            },
        );
        let output = prompt.invoke(br#"{"data":"Ada"}"#).await.unwrap();
        assert_eq!(output, "Hello, Ada!");
    }

    #[tokio::test]
    async fn resource_handler_receives_its_own_reference() {
        let resource = ResourceFn::new(
            "users",
            "db://users",
            "User table",
            |reference: ResourceReference| async move {
                Ok::<_, std::convert::Infallible>(ResourceContentData::text(reference.uri))
            },
        )
        .mime_type("text/plain");

        let content = resource.read().await.unwrap();
        assert_eq!(content, ResourceContentData::text("db://users"));
        assert_eq!(resource.identity(), "users:db://users");
    }

    #[test]
    fn describe_carries_schema_and_guide() {
        let tool = echo_tool().guide("Send a string in `data`.");
        let descriptor = tool.describe();
        assert_eq!(descriptor.name, "echo");
        assert!(descriptor.input_schema.is_some());
        assert_eq!(descriptor.guide.as_deref(), Some("Send a string in `data`."));
    }
}
