//! Envelope checks that run before dispatch.

use serde_json::Value;

use crate::types::{JsonRpcNotification, JsonRpcRequest, McpError, McpResult, JSONRPC_VERSION};

/// A request must name version 2.0, a method, and (if present) structured params.
pub fn validate_request(request: &JsonRpcRequest) -> McpResult<()> {
    check_envelope(&request.jsonrpc, &request.method, request.params.as_ref())
}

/// Same rules as requests. A bad notification is dropped, never answered.
pub fn validate_notification(notification: &JsonRpcNotification) -> McpResult<()> {
    check_envelope(
        &notification.jsonrpc,
        &notification.method,
        notification.params.as_ref(),
    )
}

fn check_envelope(jsonrpc: &str, method: &str, params: Option<&Value>) -> McpResult<()> {
    if jsonrpc != JSONRPC_VERSION {
        return Err(McpError::InvalidRequest(format!(
            "jsonrpc must be \"{JSONRPC_VERSION}\", got {jsonrpc:?}"
        )));
    }
    if method.is_empty() {
        return Err(McpError::InvalidRequest("empty method name".to_string()));
    }
    match params {
        None | Some(Value::Object(_)) | Some(Value::Array(_)) => Ok(()),
        Some(other) => Err(McpError::InvalidRequest(format!(
            "params must be an object or array, got {other}"
        ))),
    }
}
