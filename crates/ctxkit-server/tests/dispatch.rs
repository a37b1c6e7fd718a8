//! End-to-end dispatch tests: a built server driven through the full
//! operation surface the way a transport would drive it.

use ctxkit_core::{
    CapabilityKind, ClientInfo, Envelope, ErrorKind, InitializeRequest, LoggingLevel,
    PROTOCOL_VERSION, RequestOptions, ResourceContentData,
};
use ctxkit_server::adapter::{PromptFn, ResourceFn, ToolFn, echo_tool};
use ctxkit_server::{ContextDispatcher, ContextServerBuilder};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

fn demo_server() -> ContextDispatcher {
    ContextServerBuilder::new("demo-host", "0.1.0")
        .instructions("Start with `echo`.")
        .tool(echo_tool())
        .tool(ToolFn::new(
            "shout",
            "Uppercases the input",
            |input: Envelope<String>| async move {
                Ok::<_, Infallible>(input.data.to_uppercase())
            },
        ))
        .resource(
            ResourceFn::new("motd", "mem://motd", "Message of the day", |_| async {
                Ok::<_, Infallible>(ResourceContentData::text("stay curious"))
            })
            .mime_type("text/plain"),
        )
        .resource(ResourceFn::new(
            "logo",
            "mem://logo",
            "Site logo",
            |_| async { Ok::<_, Infallible>(ResourceContentData::binary(vec![0x89, 0x50, 0x4E])) },
        ))
        .prompt(PromptFn::new(
            "greet",
            "Greeting template",
            |input: Envelope<String>| async move {
                Ok::<_, Infallible>(format!("Hello, {}!", input.data))
            },
        ))
        .build()
        .unwrap()
}

async fn initialized() -> ContextDispatcher {
    let dispatcher = demo_server();
    let request = InitializeRequest::new(ClientInfo::new("test-client", "0.1.0"), BTreeMap::new());
    dispatcher.initialize(request, None).await.unwrap();
    dispatcher
}

#[tokio::test]
async fn handshake_reports_identity_and_capabilities() {
    let dispatcher = demo_server();
    let request = InitializeRequest::new(ClientInfo::new("test-client", "2.3.1"), BTreeMap::new());
    let response = dispatcher.initialize(request, None).await.unwrap();

    assert_eq!(response.protocol_version, PROTOCOL_VERSION);
    assert_eq!(response.server_info.name, "demo-host");
    assert_eq!(response.instructions.as_deref(), Some("Start with `echo`."));
    assert!(response.capabilities["tools"].supports("call"));
    assert!(response.capabilities["resources"].supports("subscribe"));
    assert!(response.capabilities["prompts"].supports("execute"));
    assert_eq!(dispatcher.client_info().unwrap().version, "2.3.1");
}

#[tokio::test]
async fn every_operation_is_rejected_before_initialize() {
    let dispatcher = demo_server();

    let not_initialized = |err: ctxkit_core::Error| {
        assert_eq!(err.kind(), ErrorKind::NotInitialized);
    };
    not_initialized(dispatcher.ping(None).await.unwrap_err());
    not_initialized(dispatcher.complete(b"x", None).await.unwrap_err());
    not_initialized(dispatcher.list_tools(None).await.unwrap_err());
    not_initialized(dispatcher.list_resources(None).await.unwrap_err());
    not_initialized(dispatcher.list_prompts(None).await.unwrap_err());
    not_initialized(
        dispatcher
            .call_tool("echo", br#"{"data":"x"}"#, None)
            .await
            .unwrap_err(),
    );
    not_initialized(dispatcher.read_resource("mem://motd", None).await.unwrap_err());
    not_initialized(
        dispatcher
            .subscribe_resource("mem://motd", None)
            .await
            .unwrap_err(),
    );
    not_initialized(dispatcher.send_roots_list_changed(None).await.unwrap_err());
}

#[tokio::test]
async fn call_tool_dispatches_by_name() {
    let dispatcher = initialized().await;

    let echoed = dispatcher
        .call_tool("echo", br#"{"data":"hello"}"#, None)
        .await
        .unwrap();
    assert_eq!(echoed, "hello");

    let shouted = dispatcher
        .call_tool("shout", br#"{"data":"quiet"}"#, None)
        .await
        .unwrap();
    assert_eq!(shouted, "QUIET");
}

#[tokio::test]
async fn unknown_tool_and_bad_params_are_distinct_errors() {
    let dispatcher = initialized().await;

    let missing = dispatcher
        .call_tool("nope", br#"{"data":"x"}"#, None)
        .await
        .unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);
    assert!(missing.is_not_found());
    assert_eq!(missing.to_string(), "tool 'nope' not found");

    let garbled = dispatcher.call_tool("echo", b"{broken", None).await.unwrap_err();
    assert_eq!(garbled.kind(), ErrorKind::Decode);
    assert!(!garbled.is_not_found());
}

#[tokio::test]
async fn listings_are_complete_and_unpaginated() {
    let dispatcher = initialized().await;

    let tools = dispatcher.list_tools(None).await.unwrap();
    let mut names: Vec<_> = tools.results.iter().map(|t| t.name.clone()).collect();
    names.sort();
    assert_eq!(names, vec!["echo", "shout"]);
    assert!(tools.next.is_none());

    let resources = dispatcher.list_resources(None).await.unwrap();
    assert_eq!(resources.results.len(), 2);
    assert!(resources.next.is_none());

    let prompts = dispatcher.list_prompts(None).await.unwrap();
    assert_eq!(prompts.results[0].name, "greet");
    assert!(prompts.next.is_none());

    // The wire form omits the cursor entirely when absent.
    let wire = serde_json::to_value(&tools).unwrap();
    assert!(wire.get("next").is_none());
}

#[tokio::test]
async fn read_resource_matches_uri_exactly() {
    let dispatcher = initialized().await;

    let content = dispatcher.read_resource("mem://motd", None).await.unwrap();
    assert_eq!(content, ResourceContentData::text("stay curious"));

    let binary = dispatcher.read_resource("mem://logo", None).await.unwrap();
    assert_eq!(binary, ResourceContentData::binary(vec![0x89, 0x50, 0x4E]));

    let err = dispatcher.read_resource("mem://motd/", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "resource 'mem://motd/' not found");
}

#[tokio::test]
async fn get_prompt_forwards_arguments() {
    let dispatcher = initialized().await;

    let params = br#"{"name":"greet","arguments":{"data":"Ada"}}"#;
    let rendered = dispatcher.get_prompt(params, None).await.unwrap();
    assert_eq!(rendered, "Hello, Ada!");

    let missing = dispatcher
        .get_prompt(br#"{"name":"absent","arguments":{}}"#, None)
        .await
        .unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);
    assert!(missing.to_string().contains("prompt 'absent'"));

    let garbled = dispatcher.get_prompt(b"not json", None).await.unwrap_err();
    assert_eq!(garbled.kind(), ErrorKind::Decode);
}

#[tokio::test]
async fn complete_echoes_with_prefix() {
    let dispatcher = initialized().await;
    let completion = dispatcher.complete(b"let x =", None).await.unwrap();
    assert_eq!(completion, "completed: let x =");
}

#[tokio::test]
async fn ping_and_roots_changed_acknowledge() {
    let dispatcher = initialized().await;
    assert_eq!(dispatcher.ping(None).await.unwrap(), "pong");
    dispatcher.send_roots_list_changed(None).await.unwrap();
}

#[tokio::test]
async fn subscription_events_flow_to_the_watcher() {
    let dispatcher = initialized().await;
    let mut events = dispatcher.watch_resource_updates();

    // Unknown URIs cannot be subscribed.
    let err = dispatcher
        .subscribe_resource("mem://absent", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    dispatcher.subscribe_resource("mem://motd", None).await.unwrap();
    assert!(dispatcher.notify_resource_updated("mem://motd"));
    // Not subscribed, so not delivered.
    assert!(!dispatcher.notify_resource_updated("mem://logo"));

    let event = events.recv().await.unwrap();
    assert_eq!(event.uri, "mem://motd");

    dispatcher.unsubscribe_resource("mem://motd", None).await.unwrap();
    assert!(!dispatcher.notify_resource_updated("mem://motd"));
    // Unsubscribing again is a tolerated no-op.
    dispatcher.unsubscribe_resource("mem://motd", None).await.unwrap();
}

#[tokio::test]
async fn slow_tool_does_not_block_other_operations() {
    let dispatcher = Arc::new(
        ContextServerBuilder::new("demo-host", "0.1.0")
            .tool(echo_tool())
            .tool(ToolFn::new(
                "slow",
                "Sleeps before answering",
                |input: Envelope<String>| async move {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Ok::<_, Infallible>(input.data)
                },
            ))
            .build()
            .unwrap(),
    );
    let request = InitializeRequest::new(ClientInfo::new("test-client", "0.1.0"), BTreeMap::new());
    dispatcher.initialize(request, None).await.unwrap();

    let slow = {
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move {
            dispatcher
                .call_tool("slow", br#"{"data":"done"}"#, None)
                .await
        })
    };

    // Ping completes while the slow handler is suspended.
    tokio::time::timeout(Duration::from_millis(100), dispatcher.ping(None))
        .await
        .expect("ping must not wait on the slow tool")
        .unwrap();

    assert_eq!(slow.await.unwrap().unwrap(), "done");
}

/// Collects formatted log output for assertions.
#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self {
        self.clone()
    }
}

#[tokio::test]
async fn session_logging_level_suppresses_dispatcher_events() {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(capture.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let dispatcher = initialized().await;
    assert!(capture.contents().contains("session initialized"));

    // Debug events sit below the default (info) minimum severity.
    dispatcher
        .call_tool("echo", br#"{"data":"x"}"#, None)
        .await
        .unwrap();
    assert!(!capture.contents().contains("calling tool"));

    dispatcher
        .set_logging_level(LoggingLevel::Debug, None)
        .await
        .unwrap();
    dispatcher
        .call_tool("echo", br#"{"data":"x"}"#, None)
        .await
        .unwrap();
    assert!(capture.contents().contains("calling tool"));

    dispatcher
        .set_logging_level(LoggingLevel::Error, None)
        .await
        .unwrap();
    dispatcher.read_resource("mem://motd", None).await.unwrap();
    assert!(!capture.contents().contains("reading resource"));
}

#[tokio::test]
async fn request_options_are_advisory() {
    let dispatcher = initialized().await;
    let options = Some(RequestOptions::with_timeout(5.0));
    assert_eq!(dispatcher.ping(options).await.unwrap(), "pong");
}

#[tokio::test]
async fn capability_map_mirrors_registrations() {
    let dispatcher = ContextServerBuilder::new("tools-only", "0.1.0")
        .tool(echo_tool())
        .build()
        .unwrap();
    let request = InitializeRequest::new(ClientInfo::new("c", "0"), BTreeMap::new());
    let response = dispatcher.initialize(request, None).await.unwrap();

    assert!(response.capabilities.contains_key("tools"));
    assert!(!response.capabilities.contains_key("resources"));
    assert!(!response.capabilities.contains_key("prompts"));
    assert!(response.instructions.is_none());
}

#[tokio::test]
async fn not_found_errors_name_the_capability_kind() {
    let dispatcher = initialized().await;

    let tool = dispatcher.call_tool("x", b"{}", None).await.unwrap_err();
    let resource = dispatcher.read_resource("x", None).await.unwrap_err();
    match (&tool, &resource) {
        (
            ctxkit_core::Error::NotFound { kind: tool_kind, .. },
            ctxkit_core::Error::NotFound { kind: resource_kind, .. },
        ) => {
            assert_eq!(*tool_kind, CapabilityKind::Tool);
            assert_eq!(*resource_kind, CapabilityKind::Resource);
        }
        other => panic!("expected NotFound pair, got {other:?}"),
    }
}
