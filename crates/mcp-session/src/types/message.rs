//! JSON-RPC 2.0 message types for the MCP protocol.
//!
//! Every line on the wire decodes into a flat [`Envelope`]. The envelope is then
//! classified into a [`JsonRpcMessage`], which is what the dispatcher works with.
//! Outgoing messages take the reverse path, so the "exactly one of result/error"
//! and "notifications carry no id" rules are enforced by construction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{DecodeError, McpError};

/// JSON-RPC 2.0 protocol version.
pub const JSONRPC_VERSION: &str = "2.0";

/// Unique request identifier — a string or a number, echoed back exactly.
///
/// Numbers are kept as [`serde_json::Number`] with `arbitrary_precision`, so
/// the literal text (`1e2`, `-0`, integers past `u64::MAX`) goes back out
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(serde_json::Number),
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        RequestId::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom("id must be a string or a number"))
    }
}

impl RequestId {
    /// Normalized key used for in-flight bookkeeping. Never put on the wire.
    pub fn correlation_key(&self) -> String {
        match self {
            RequestId::String(s) => s.clone(),
            RequestId::Number(n) => n.to_string(),
        }
    }

    /// Best-effort recovery of an id from a raw JSON value.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(RequestId::String(s.clone())),
            Value::Number(n) => Some(RequestId::Number(n.clone())),
            _ => None,
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n.into())
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::String(s) => write!(f, "{s:?}"),
            RequestId::Number(n) => write!(f, "{n}"),
        }
    }
}

/// The wire-level shape of every message: all fields optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcErrorObject>,
}

/// A JSON-RPC 2.0 request message.
#[derive(Debug, Clone)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: RequestId,
    pub method: String,
    pub params: Option<Value>,
}

/// A JSON-RPC 2.0 success response.
#[derive(Debug, Clone)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: RequestId,
    pub result: Value,
}

/// A JSON-RPC 2.0 error response.
#[derive(Debug, Clone)]
pub struct JsonRpcError {
    pub jsonrpc: String,
    pub id: RequestId,
    pub error: JsonRpcErrorObject,
}

/// Error object within a JSON-RPC error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A JSON-RPC 2.0 notification (no id, no response expected).
#[derive(Debug, Clone)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: Option<Value>,
}

/// Union type for any JSON-RPC message.
#[derive(Debug, Clone)]
pub enum JsonRpcMessage {
    Request(JsonRpcRequest),
    Response(JsonRpcResponse),
    Error(JsonRpcError),
    Notification(JsonRpcNotification),
}

impl JsonRpcResponse {
    pub fn new(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result,
        }
    }
}

impl JsonRpcError {
    pub fn new(id: RequestId, code: i32, message: String) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcErrorObject {
                code,
                message,
                data: None,
            },
        }
    }
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
        }
    }
}

impl JsonRpcMessage {
    /// The correlation id, if this message carries one.
    pub fn id(&self) -> Option<&RequestId> {
        match self {
            JsonRpcMessage::Request(r) => Some(&r.id),
            JsonRpcMessage::Response(r) => Some(&r.id),
            JsonRpcMessage::Error(e) => Some(&e.id),
            JsonRpcMessage::Notification(_) => None,
        }
    }

    /// The method name for requests and notifications.
    pub fn method(&self) -> Option<&str> {
        match self {
            JsonRpcMessage::Request(r) => Some(&r.method),
            JsonRpcMessage::Notification(n) => Some(&n.method),
            _ => None,
        }
    }

    pub fn into_envelope(self) -> Envelope {
        Envelope::from(self)
    }

    /// Serialize to a JSON value (used by tests and diagnostics).
    pub fn to_value(&self) -> Value {
        serde_json::to_value(Envelope::from(self.clone())).unwrap_or_default()
    }
}

impl From<JsonRpcMessage> for Envelope {
    fn from(message: JsonRpcMessage) -> Self {
        match message {
            JsonRpcMessage::Request(r) => Envelope {
                id: Some(r.id),
                jsonrpc: r.jsonrpc,
                method: Some(r.method),
                params: r.params,
                ..Default::default()
            },
            JsonRpcMessage::Response(r) => Envelope {
                id: Some(r.id),
                jsonrpc: r.jsonrpc,
                result: Some(r.result),
                ..Default::default()
            },
            JsonRpcMessage::Error(e) => Envelope {
                id: Some(e.id),
                jsonrpc: e.jsonrpc,
                error: Some(e.error),
                ..Default::default()
            },
            JsonRpcMessage::Notification(n) => Envelope {
                jsonrpc: n.jsonrpc,
                method: Some(n.method),
                params: n.params,
                ..Default::default()
            },
        }
    }
}

impl From<JsonRpcResponse> for JsonRpcMessage {
    fn from(r: JsonRpcResponse) -> Self {
        JsonRpcMessage::Response(r)
    }
}

impl From<JsonRpcError> for JsonRpcMessage {
    fn from(e: JsonRpcError) -> Self {
        JsonRpcMessage::Error(e)
    }
}

impl From<JsonRpcNotification> for JsonRpcMessage {
    fn from(n: JsonRpcNotification) -> Self {
        JsonRpcMessage::Notification(n)
    }
}

impl TryFrom<Envelope> for JsonRpcMessage {
    type Error = McpError;

    fn try_from(envelope: Envelope) -> Result<Self, McpError> {
        let Envelope {
            id,
            jsonrpc,
            method,
            params,
            result,
            error,
        } = envelope;

        match (method, id) {
            (Some(method), Some(id)) => Ok(JsonRpcMessage::Request(JsonRpcRequest {
                jsonrpc,
                id,
                method,
                params,
            })),
            (Some(method), None) => Ok(JsonRpcMessage::Notification(JsonRpcNotification {
                jsonrpc,
                method,
                params,
            })),
            (None, Some(id)) => match (result, error) {
                (Some(result), None) => Ok(JsonRpcMessage::Response(JsonRpcResponse {
                    jsonrpc,
                    id,
                    result,
                })),
                (None, Some(error)) => Ok(JsonRpcMessage::Error(JsonRpcError { jsonrpc, id, error })),
                _ => Err(McpError::Decode(DecodeError::new(
                    Some(id),
                    "response must carry exactly one of result or error",
                ))),
            },
            (None, None) => Err(McpError::Decode(DecodeError::new(
                None,
                "message has neither method nor id",
            ))),
        }
    }
}
