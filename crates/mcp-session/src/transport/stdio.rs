//! Newline-delimited stream transport — stdin/stdout for desktop MCP clients,
//! or any other pair of async byte streams.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

use crate::types::{DecodeError, JsonRpcMessage, McpError, McpResult};

use super::{framing, Transport};

struct LineReader<R> {
    inner: BufReader<R>,
    eof: bool,
}

/// One JSON record per line over a reader/writer pair.
pub struct StreamTransport<R, W> {
    reader: Mutex<LineReader<R>>,
    writer: Mutex<W>,
    closed: AtomicBool,
}

/// The transport MCP desktop clients launch us with.
pub type StdioTransport = StreamTransport<tokio::io::Stdin, tokio::io::Stdout>;

impl<R, W> StreamTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: Mutex::new(LineReader {
                inner: BufReader::new(reader),
                eof: false,
            }),
            writer: Mutex::new(writer),
            closed: AtomicBool::new(false),
        }
    }
}

impl StreamTransport<tokio::io::Stdin, tokio::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

#[async_trait]
impl<R, W> Transport for StreamTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&self, message: &JsonRpcMessage) -> McpResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(McpError::Transport("transport is closed".to_string()));
        }

        // Encode outside the lock; the critical section is one write + flush.
        let framed = framing::frame_message(message)?;

        let mut writer = self.writer.lock().await;
        writer.write_all(framed.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn receive(&self) -> McpResult<Option<JsonRpcMessage>> {
        let mut guard = self.reader.lock().await;
        let reader = &mut *guard;

        loop {
            if reader.eof || self.closed.load(Ordering::Acquire) {
                return Ok(None);
            }

            let mut buf = Vec::new();
            let bytes_read = reader.inner.read_until(b'\n', &mut buf).await?;

            if bytes_read == 0 {
                tracing::info!("EOF on input stream");
                reader.eof = true;
                return Ok(None);
            }

            if buf.last() != Some(&b'\n') {
                reader.eof = true;
                let partial = String::from_utf8_lossy(&buf);
                if partial.trim().is_empty() {
                    return Ok(None);
                }
                return Err(McpError::Decode(DecodeError::new(
                    framing::salvage_id(&partial),
                    "unterminated message at end of stream",
                )));
            }

            let line = std::str::from_utf8(&buf).map_err(|e| {
                let id = framing::salvage_id(&String::from_utf8_lossy(&buf));
                McpError::Decode(DecodeError::new(id, e.to_string()))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            return framing::parse_message(line).map(Some);
        }
    }

    async fn close(&self) -> McpResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let mut writer = self.writer.lock().await;
        writer.flush().await?;
        writer.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{JsonRpcNotification, RequestId};
    use std::sync::Arc;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_reads_records_and_skips_blank_lines() {
        let input: &[u8] = b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/list\"}\n\n\
{\"jsonrpc\":\"2.0\",\"method\":\"initialized\"}\n";
        let transport = StreamTransport::new(input, tokio::io::sink());

        let first = transport.receive().await.unwrap().unwrap();
        assert_eq!(first.method(), Some("tools/list"));
        let second = transport.receive().await.unwrap().unwrap();
        assert!(matches!(second, JsonRpcMessage::Notification(_)));
        assert!(transport.receive().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unterminated_tail_is_decode_error() {
        let input: &[u8] = b"{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"tools/list\"}";
        let transport = StreamTransport::new(input, tokio::io::sink());

        match transport.receive().await {
            Err(McpError::Decode(e)) => assert_eq!(e.id, Some(RequestId::from(3))),
            other => panic!("expected decode error, got {other:?}"),
        }
        assert!(transport.receive().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_keeps_its_id() {
        let input: &[u8] =
            b"{\"jsonrpc\":\"2.0\",\"id\":9,\"method\":\"tools/call\",\"params\":{\"name\":\"\xff\"}}\n";
        let transport = StreamTransport::new(input, tokio::io::sink());

        match transport.receive().await {
            Err(McpError::Decode(e)) => assert_eq!(e.id, Some(RequestId::from(9))),
            other => panic!("expected decode error, got {other:?}"),
        }
        assert!(transport.receive().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scripted_reader_split_across_reads() {
        let reader = tokio_test::io::Builder::new()
            .read(b"{\"jsonrpc\":\"2.0\",")
            .read(b"\"id\":\"x\",\"method\":\"ping\"}\n")
            .build();
        let transport = StreamTransport::new(reader, tokio::io::sink());

        let msg = transport.receive().await.unwrap().unwrap();
        assert_eq!(msg.id(), Some(&RequestId::from("x")));
        assert!(transport.receive().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_sends_do_not_interleave() {
        let (client, server) = tokio::io::duplex(64);
        let transport = Arc::new(StreamTransport::new(tokio::io::empty(), server));

        let mut handles = Vec::new();
        for i in 0..50 {
            let transport = transport.clone();
            handles.push(tokio::spawn(async move {
                let payload = serde_json::json!({ "seq": i, "pad": "x".repeat(200) });
                transport
                    .send(&JsonRpcNotification::new("notifications/message", Some(payload)).into())
                    .await
                    .unwrap();
            }));
        }

        let reader = tokio::spawn(async move {
            let mut client = client;
            let mut out = String::new();
            client.read_to_string(&mut out).await.unwrap();
            out
        });

        for handle in handles {
            handle.await.unwrap();
        }
        transport.close().await.unwrap();
        drop(transport);

        let out = reader.await.unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 50);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["method"], "notifications/message");
        }
    }

    #[tokio::test]
    async fn test_send_after_close_fails() {
        let transport = StreamTransport::new(tokio::io::empty(), tokio::io::sink());
        transport.close().await.unwrap();
        let err = transport
            .send(&JsonRpcNotification::new("notifications/message", None).into())
            .await
            .unwrap_err();
        assert!(err.is_transport_fault());
    }
}
