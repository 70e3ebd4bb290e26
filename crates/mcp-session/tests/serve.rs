//! End-to-end tests: a session served over an in-memory duplex stream.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use mcp_session::types::*;
use mcp_session::{
    JsonObject, RequestContext, Session, SessionOptions, StreamTransport, ToolEntry, Transport,
};

struct Client {
    lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer: WriteHalf<DuplexStream>,
}

impl Client {
    async fn send_line(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
    }

    async fn send(&mut self, msg: Value) {
        self.send_line(&msg.to_string()).await;
    }

    async fn recv(&mut self) -> Value {
        let line = tokio::time::timeout(Duration::from_secs(5), self.lines.next_line())
            .await
            .expect("timed out waiting for a message")
            .unwrap()
            .expect("stream closed");
        serde_json::from_str(&line).unwrap()
    }

    async fn request(&mut self, msg: Value) -> Value {
        self.send(msg).await;
        self.recv().await
    }

    async fn hang_up(mut self) {
        self.writer.shutdown().await.unwrap();
    }
}

async fn add(_ctx: RequestContext, args: JsonObject) -> anyhow::Result<Vec<ToolContent>> {
    let a = args.get("a").and_then(Value::as_i64).unwrap_or(0);
    let b = args.get("b").and_then(Value::as_i64).unwrap_or(0);
    // Finish out of order so correlation is actually exercised.
    tokio::time::sleep(Duration::from_millis((50 - a.clamp(0, 50)) as u64)).await;
    Ok(vec![ToolContent::text((a + b).to_string())])
}

fn start(
    session: Session,
    shutdown: CancellationToken,
) -> (Arc<Session>, Client, JoinHandle<McpResult<()>>) {
    let (client_side, server_side) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server_side);
    let transport: Arc<dyn Transport> = Arc::new(StreamTransport::new(server_read, server_write));

    let session = Arc::new(session);
    let task = tokio::spawn(session.clone().serve(transport, shutdown));

    let (client_read, client_write) = tokio::io::split(client_side);
    let client = Client {
        lines: BufReader::new(client_read).lines(),
        writer: client_write,
    };
    (session, client, task)
}

async fn adder_session() -> Session {
    let session = Session::new("e2e", "1.0.0");
    session
        .add_tool(ToolEntry::new("add", "Add two integers", json!({}), add))
        .await;
    session
}

fn initialize(id: i64) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": { "name": "e2e-client", "version": "1.0" }
        }
    })
}

#[tokio::test]
async fn test_full_session_lifecycle() {
    let (session, mut client, task) = start(adder_session().await, CancellationToken::new());

    let resp = client
        .request(json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/list" }))
        .await;
    assert_eq!(resp["error"]["code"], -32002);

    let resp = client.request(initialize(2)).await;
    assert_eq!(resp["result"]["serverInfo"]["name"], "e2e");
    client
        .send(json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }))
        .await;

    let resp = client
        .request(json!({
            "jsonrpc": "2.0",
            "id": "call-1",
            "method": "tools/call",
            "params": { "name": "add", "arguments": { "a": 40, "b": 2 } }
        }))
        .await;
    assert_eq!(resp["id"], "call-1");
    assert_eq!(resp["result"]["content"][0]["text"], "42");
    assert!(session.is_connected().await);

    client.hang_up().await;
    task.await.unwrap().unwrap();
    assert!(!session.is_connected().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pipelined_requests_are_correlated() {
    let (_session, mut client, task) = start(adder_session().await, CancellationToken::new());
    client.request(initialize(0)).await;

    for i in 1..=30i64 {
        client
            .send(json!({
                "jsonrpc": "2.0",
                "id": i,
                "method": "tools/call",
                "params": { "name": "add", "arguments": { "a": i, "b": 100 } }
            }))
            .await;
    }

    let mut seen = HashMap::new();
    for _ in 1..=30 {
        let resp = client.recv().await;
        let id = resp["id"].as_i64().unwrap();
        seen.insert(id, resp["result"]["content"][0]["text"].as_str().unwrap().to_string());
    }
    for i in 1..=30i64 {
        assert_eq!(seen[&i], (i + 100).to_string());
    }

    client.hang_up().await;
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_malformed_lines_do_not_end_the_session() {
    let (_session, mut client, task) = start(adder_session().await, CancellationToken::new());
    client.request(initialize(0)).await;

    // Unparseable with no recoverable id: dropped silently.
    client.send_line("{not json").await;
    // Valid JSON with a bad shape: the id survives, so a parse error comes back.
    let resp = client
        .request(json!({ "jsonrpc": 2, "id": 11, "method": "tools/list" }))
        .await;
    assert_eq!(resp["id"], 11);
    assert_eq!(resp["error"]["code"], -32700);

    let resp = client
        .request(json!({ "jsonrpc": "2.0", "id": 12, "method": "tools/list" }))
        .await;
    assert_eq!(resp["id"], 12);
    assert_eq!(resp["result"]["tools"][0]["name"], "add");

    client.hang_up().await;
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_notifier_shares_the_transport() {
    let (session, mut client, task) = start(adder_session().await, CancellationToken::new());
    client.request(initialize(0)).await;

    let notifier = session.notifier().await.unwrap();
    notifier.tools_list_changed().await.unwrap();
    let msg = client.recv().await;
    assert_eq!(msg["method"], "notifications/tools/list_changed");
    assert!(msg.get("id").is_none());

    notifier.resource_updated("info://server").await.unwrap();
    let msg = client.recv().await;
    assert_eq!(msg["method"], "notifications/resources/updated");
    assert_eq!(msg["params"]["uri"], "info://server");

    notifier
        .log_message(LogLevel::Warning, json!({ "disk": "low" }), Some("storage"))
        .await
        .unwrap();
    let msg = client.recv().await;
    assert_eq!(msg["method"], "notifications/message");
    assert_eq!(msg["params"]["level"], "warning");
    assert_eq!(msg["params"]["logger"], "storage");
    assert_eq!(msg["params"]["data"]["disk"], "low");

    client.hang_up().await;
    task.await.unwrap().unwrap();
    assert!(session.notifier().await.is_err());
}

#[tokio::test]
async fn test_shutdown_token_stops_the_loop() {
    let shutdown = CancellationToken::new();
    let (_session, mut client, task) = start(adder_session().await, shutdown.clone());
    client.request(initialize(0)).await;

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("serve did not stop")
        .unwrap()
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_bounded_in_flight_still_answers_everything() {
    let session = adder_session().await.with_options(SessionOptions {
        max_in_flight: Some(2),
        ..SessionOptions::default()
    });
    let (_session, mut client, task) = start(session, CancellationToken::new());
    client.request(initialize(0)).await;

    for i in 1..=10i64 {
        client
            .send(json!({
                "jsonrpc": "2.0",
                "id": i,
                "method": "tools/call",
                "params": { "name": "add", "arguments": { "a": i, "b": i } }
            }))
            .await;
    }
    let mut ids: Vec<i64> = Vec::new();
    for _ in 0..10 {
        ids.push(client.recv().await["id"].as_i64().unwrap());
    }
    ids.sort_unstable();
    assert_eq!(ids, (1..=10).collect::<Vec<_>>());

    client.hang_up().await;
    task.await.unwrap().unwrap();
}
