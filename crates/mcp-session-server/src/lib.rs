//! MCP session server — the mcp-session engine wired to stdio, with a
//! calculator tool, a greeting prompt, and a few demo resources.

pub mod capabilities;
pub mod config;

use std::sync::Arc;

use mcp_session::types::McpResult;
use mcp_session::{Session, SessionOptions};

pub use config::ServerConfig;

/// Build a session for `config` with every bundled capability registered.
pub async fn build_session(config: &ServerConfig) -> McpResult<Arc<Session>> {
    let session = Session::new(&config.name, &config.version).with_options(SessionOptions {
        max_in_flight: config.max_in_flight,
        instructions: Some(
            "Use the calculate tool for arithmetic and the greeting prompt to greet someone."
                .to_string(),
        ),
    });
    capabilities::register_all(&session).await?;
    Ok(Arc::new(session))
}
