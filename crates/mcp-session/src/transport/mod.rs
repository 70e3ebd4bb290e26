//! Transport layer for MCP communication.

pub mod framing;
pub mod stdio;

use async_trait::async_trait;

use crate::types::{JsonRpcMessage, McpResult};

pub use stdio::{StdioTransport, StreamTransport};

/// A duplex message channel.
///
/// `send` may be called from many tasks at once and must never interleave two
/// records. `receive` has a single logical reader; it returns `Ok(None)` once
/// the peer has closed the stream, and `Err(McpError::Decode(_))` for a
/// malformed record (the stream remains usable afterwards).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, message: &JsonRpcMessage) -> McpResult<()>;

    async fn receive(&self) -> McpResult<Option<JsonRpcMessage>>;

    async fn close(&self) -> McpResult<()>;
}
