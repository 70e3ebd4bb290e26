//! The `initialize` handshake.

use crate::session::Session;
use crate::types::{InitializeParams, InitializeResult, MCP_VERSION};

/// Answer an `initialize` request.
///
/// Version negotiation is advertise-only: whatever the client asks for, the
/// reply names [`MCP_VERSION`]. Only the first call flips the session into the
/// initialized state and records the client; repeats get the same answer.
pub fn negotiate(session: &Session, params: InitializeParams) -> InitializeResult {
    if params.protocol_version != MCP_VERSION {
        tracing::warn!(
            "Client requested protocol version {}, server supports {}. Proceeding with server version.",
            params.protocol_version,
            MCP_VERSION
        );
    }

    if session.mark_initialized(params.client_info.clone()) {
        tracing::info!(
            "Initialized with client: {} v{}",
            params.client_info.name,
            params.client_info.version
        );
    } else {
        tracing::debug!("Repeated initialize from {}", params.client_info.name);
    }

    session.initialize_result()
}

/// The peer's `initialized` notification.
pub fn acknowledge(session: &Session) {
    if session.is_initialized() {
        tracing::info!("MCP handshake complete");
    } else {
        tracing::debug!("Received initialized notification before initialize");
    }
}
