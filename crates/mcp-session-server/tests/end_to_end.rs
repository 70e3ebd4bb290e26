//! The bundled server capabilities, exercised through the protocol the way a
//! desktop client would.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader, Lines};
use tokio_util::sync::CancellationToken;

use mcp_session::protocol::ProtocolHandler;
use mcp_session::transport::framing;
use mcp_session::{StreamTransport, Transport};
use mcp_session_server::{build_session, ServerConfig};

fn test_config() -> ServerConfig {
    ServerConfig {
        name: "Calculator".to_string(),
        version: "1.0.0".to_string(),
        max_in_flight: None,
    }
}

fn mcp_request(id: i64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    })
}

fn init_request() -> Value {
    mcp_request(
        0,
        "initialize",
        json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": { "name": "test-client", "version": "1.0" }
        }),
    )
}

async fn send_unwrap(handler: &ProtocolHandler, msg: Value) -> Value {
    let parsed = framing::parse_message(&msg.to_string()).unwrap();
    handler
        .handle_message(parsed)
        .await
        .expect("expected response")
        .to_value()
}

async fn ready_handler() -> ProtocolHandler {
    let session = build_session(&test_config()).await.unwrap();
    let handler = ProtocolHandler::new(session);
    send_unwrap(&handler, init_request()).await;
    handler
}

async fn calculate(handler: &ProtocolHandler, id: i64, operation: &str, a: f64, b: f64) -> Value {
    send_unwrap(
        handler,
        mcp_request(
            id,
            "tools/call",
            json!({ "name": "calculate", "arguments": { "operation": operation, "a": a, "b": b } }),
        ),
    )
    .await
}

async fn next_message<R>(lines: &mut Lines<BufReader<R>>) -> Value
where
    R: AsyncRead + Unpin,
{
    let line = tokio::time::timeout(Duration::from_secs(5), lines.next_line())
        .await
        .expect("timed out waiting for a message")
        .unwrap()
        .expect("stream closed");
    serde_json::from_str(&line).unwrap()
}

#[tokio::test]
async fn test_initialize_advertises_configured_identity() {
    let session = build_session(&test_config()).await.unwrap();
    let handler = ProtocolHandler::new(session);
    let resp = send_unwrap(&handler, init_request()).await;

    assert_eq!(resp["result"]["serverInfo"]["name"], "Calculator");
    assert_eq!(resp["result"]["serverInfo"]["version"], "1.0.0");
    assert!(resp["result"]["instructions"].as_str().unwrap().contains("calculate"));
    for feature in ["resources", "tools", "prompts", "logging"] {
        assert!(resp["result"]["capabilities"].get(feature).is_some(), "{feature}");
    }
}

#[tokio::test]
async fn test_calculator_operations() {
    let handler = ready_handler().await;

    let resp = calculate(&handler, 1, "add", 2.0, 3.0).await;
    assert_eq!(resp["result"]["content"][0]["text"], "Result: 5");
    assert_eq!(resp["result"]["isError"], false);

    let resp = calculate(&handler, 2, "multiply", 1.5, 4.0).await;
    assert_eq!(resp["result"]["content"][0]["text"], "Result: 6");

    let resp = calculate(&handler, 3, "divide", 1.0, 4.0).await;
    assert_eq!(resp["result"]["content"][0]["text"], "Result: 0.25");
}

#[tokio::test]
async fn test_divide_by_zero_is_flagged_result() {
    let handler = ready_handler().await;
    let resp = calculate(&handler, 4, "divide", 1.0, 0.0).await;

    assert!(resp.get("error").is_none());
    assert_eq!(resp["result"]["isError"], true);
    assert_eq!(resp["result"]["content"][0]["text"], "Error: division by zero");
}

#[tokio::test]
async fn test_unknown_operation_is_flagged_result() {
    let handler = ready_handler().await;
    let resp = calculate(&handler, 5, "modulo", 1.0, 2.0).await;
    assert_eq!(resp["result"]["isError"], true);
    assert_eq!(
        resp["result"]["content"][0]["text"],
        "Error: unknown operation: modulo"
    );
}

#[tokio::test]
async fn test_listed_capabilities() {
    let handler = ready_handler().await;

    let resp = send_unwrap(&handler, mcp_request(1, "tools/list", json!({}))).await;
    let tool = &resp["result"]["tools"][0];
    assert_eq!(tool["name"], "calculate");
    assert_eq!(tool["inputSchema"]["required"], json!(["operation", "a", "b"]));

    let resp = send_unwrap(&handler, mcp_request(2, "prompts/list", json!({}))).await;
    assert_eq!(resp["result"]["prompts"][0]["name"], "greeting");

    let resp = send_unwrap(&handler, mcp_request(3, "resources/list", json!({}))).await;
    let uris: Vec<&str> = resp["result"]["resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["uri"].as_str().unwrap())
        .collect();
    assert_eq!(uris, vec!["info://server", "time://now", "user://{userId}"]);
}

#[tokio::test]
async fn test_resource_reads() {
    let handler = ready_handler().await;

    let resp = send_unwrap(
        &handler,
        mcp_request(1, "resources/read", json!({ "uri": "info://server" })),
    )
    .await;
    let content = &resp["result"]["contents"][0];
    assert_eq!(content["mimeType"], "application/json");
    let body: Value = serde_json::from_str(content["text"].as_str().unwrap()).unwrap();
    assert_eq!(body["name"], "Calculator");

    let resp = send_unwrap(
        &handler,
        mcp_request(2, "resources/read", json!({ "uri": "user://42" })),
    )
    .await;
    let body: Value =
        serde_json::from_str(resp["result"]["contents"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(body["id"], "42");

    let resp = send_unwrap(
        &handler,
        mcp_request(3, "resources/read", json!({ "uri": "user://42/extra" })),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32602);
}

#[tokio::test]
async fn test_greeting_prompt() {
    let handler = ready_handler().await;

    let resp = send_unwrap(
        &handler,
        mcp_request(
            1,
            "prompts/get",
            json!({ "name": "greeting", "arguments": { "name": "Ada", "style": "formal" } }),
        ),
    )
    .await;
    let text = resp["result"]["messages"][0]["content"]["text"].as_str().unwrap();
    assert!(text.contains("formal") && text.contains("Ada"));

    let resp = send_unwrap(
        &handler,
        mcp_request(2, "prompts/get", json!({ "name": "greeting", "arguments": { "name": "Ada", "style": "haiku" } })),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32603);
}

#[tokio::test]
async fn test_served_over_a_stream() {
    let session = build_session(&test_config()).await.unwrap();

    let (client, server) = tokio::io::duplex(16 * 1024);
    let (server_read, server_write) = tokio::io::split(server);
    let transport: Arc<dyn Transport> = Arc::new(StreamTransport::new(server_read, server_write));
    let task = tokio::spawn(session.serve(transport, CancellationToken::new()));

    let (client_read, mut client_write) = tokio::io::split(client);
    let mut lines = BufReader::new(client_read).lines();

    // Wait for the handshake reply; requests after it are dispatched concurrently.
    client_write
        .write_all(format!("{}\n", init_request()).as_bytes())
        .await
        .unwrap();
    let init = next_message(&mut lines).await;
    assert_eq!(init["id"], 0);

    for msg in [
        json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
        mcp_request(
            1,
            "tools/call",
            json!({ "name": "calculate", "arguments": { "operation": "subtract", "a": 10, "b": 4 } }),
        ),
    ] {
        client_write.write_all(format!("{msg}\n").as_bytes()).await.unwrap();
    }

    let resp = next_message(&mut lines).await;
    assert_eq!(resp["id"], 1);
    assert_eq!(resp["result"]["content"][0]["text"], "Result: 6");

    client_write.shutdown().await.unwrap();
    task.await.unwrap().unwrap();
}
