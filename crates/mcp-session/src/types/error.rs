//! Error types and JSON-RPC error codes for the MCP session engine.

use super::message::{JsonRpcError, JsonRpcErrorObject, RequestId, JSONRPC_VERSION};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// MCP-specific error codes.
pub mod mcp_error_codes {
    /// Any request other than `initialize` before the handshake.
    pub const NOT_INITIALIZED: i32 = -32002;
}

/// A malformed inbound line, with whatever id could be recovered from it.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeError {
    pub id: Option<RequestId>,
    pub reason: String,
}

impl DecodeError {
    pub fn new(id: Option<RequestId>, reason: impl Into<String>) -> Self {
        Self {
            id,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reason)
    }
}

/// All errors that can occur in the session engine.
#[derive(thiserror::Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Parse error: {0}")]
    Decode(DecodeError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Server not initialized")]
    NotInitialized,

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Prompt not found: {0}")]
    PromptNotFound(String),

    #[error("Invalid URI template {template:?}: {reason}")]
    Template { template: String, reason: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    pub fn code(&self) -> i32 {
        use error_codes::*;
        use mcp_error_codes::*;
        match self {
            McpError::ParseError(_) | McpError::Decode(_) | McpError::Json(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_)
            | McpError::ResourceNotFound(_)
            | McpError::ToolNotFound(_)
            | McpError::PromptNotFound(_)
            | McpError::Template { .. } => INVALID_PARAMS,
            McpError::InternalError(_) => INTERNAL_ERROR,
            McpError::NotInitialized => NOT_INITIALIZED,
            McpError::Transport(_) | McpError::Io(_) => INTERNAL_ERROR,
        }
    }

    /// Whether this error ends the session rather than being answered.
    pub fn is_transport_fault(&self) -> bool {
        matches!(self, McpError::Transport(_) | McpError::Io(_))
    }

    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        JsonRpcError {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcErrorObject {
                code: self.code(),
                message: self.to_string(),
                data: None,
            },
        }
    }
}

pub type McpResult<T> = Result<T, McpError>;
