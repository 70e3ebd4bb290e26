//! Message framing for newline-delimited JSON.

use serde_json::Value;

use crate::types::{DecodeError, Envelope, JsonRpcMessage, McpError, McpResult, RequestId};

/// Parse a single line of text as a JSON-RPC message.
///
/// On failure the returned [`McpError::Decode`] carries the request id when
/// one could be recovered, so the caller can still answer with a parse error.
pub fn parse_message(line: &str) -> McpResult<JsonRpcMessage> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(McpError::Decode(DecodeError::new(None, "Empty message")));
    }

    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| McpError::Decode(DecodeError::new(None, e.to_string())))?;

    let salvaged_id = value.get("id").and_then(RequestId::from_value);

    let envelope: Envelope = serde_json::from_value(value)
        .map_err(|e| McpError::Decode(DecodeError::new(salvaged_id, e.to_string())))?;

    JsonRpcMessage::try_from(envelope)
}

/// Recover the id from a line that is known to be unusable.
pub fn salvage_id(line: &str) -> Option<RequestId> {
    serde_json::from_str::<Value>(line.trim())
        .ok()
        .and_then(|v| v.get("id").and_then(RequestId::from_value))
}

/// Serialize a message to a JSON line (with trailing newline).
pub fn frame_message(message: &JsonRpcMessage) -> McpResult<String> {
    let mut json = serde_json::to_string(&Envelope::from(message.clone())).map_err(McpError::Json)?;
    json.push('\n');
    Ok(json)
}
