//! Main request dispatcher — receives JSON-RPC messages, routes to handlers.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::context::RequestContext;
use crate::resources::registry::ResolvedResource;
use crate::session::Session;
use crate::types::*;

use super::method::Method;
use super::negotiation;
use super::validator::{validate_notification, validate_request};

/// The protocol handler that dispatches incoming JSON-RPC messages.
///
/// Each call to [`handle_message`](Self::handle_message) is independent, so
/// the caller may run many of them concurrently.
pub struct ProtocolHandler {
    session: Arc<Session>,
    shutdown: CancellationToken,
    in_flight: Mutex<HashMap<String, Vec<InFlight>>>,
    next_seq: AtomicU64,
}

/// One running request. Ids can collide, so entries are told apart by `seq`.
struct InFlight {
    seq: u64,
    token: CancellationToken,
}

impl ProtocolHandler {
    pub fn new(session: Arc<Session>) -> Self {
        Self::with_shutdown(session, CancellationToken::new())
    }

    /// Request contexts are children of `shutdown`.
    pub fn with_shutdown(session: Arc<Session>, shutdown: CancellationToken) -> Self {
        Self {
            session,
            shutdown,
            in_flight: Mutex::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Handle one inbound message. Returns the response to send, if any.
    pub async fn handle_message(&self, msg: JsonRpcMessage) -> Option<JsonRpcMessage> {
        match msg {
            JsonRpcMessage::Request(req) => Some(self.handle_request(req).await),
            JsonRpcMessage::Notification(notif) => {
                self.handle_notification(notif).await;
                None
            }
            _ => {
                tracing::warn!("Received unexpected message type from client");
                None
            }
        }
    }

    /// Parse-error reply for a malformed line, when its id survived.
    pub fn decode_failure(error: &DecodeError) -> Option<JsonRpcMessage> {
        let id = error.id.clone()?;
        let err = McpError::ParseError(error.reason.clone());
        Some(err.to_json_rpc_error(id).into())
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcMessage {
        let id = request.id.clone();

        if let Err(e) = validate_request(&request) {
            return e.to_json_rpc_error(id).into();
        }

        let key = id.correlation_key();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let token = self.shutdown.child_token();
        self.in_flight
            .lock()
            .await
            .entry(key.clone())
            .or_default()
            .push(InFlight {
                seq,
                token: token.clone(),
            });

        let ctx = RequestContext::new(Some(id.clone()), token);
        let result = self.dispatch_request(&request, ctx).await;

        self.finish(&key, seq).await;

        match result {
            Ok(value) => JsonRpcResponse::new(id, value).into(),
            Err(e) => {
                tracing::debug!("Request {id} ({}) failed: {e}", request.method);
                e.to_json_rpc_error(id).into()
            }
        }
    }

    async fn dispatch_request(
        &self,
        request: &JsonRpcRequest,
        ctx: RequestContext,
    ) -> McpResult<Value> {
        let method = Method::from_name(&request.method);

        if !self.session.is_initialized() && method != Some(Method::Initialize) {
            return Err(McpError::NotInitialized);
        }

        let Some(method) = method else {
            return Err(McpError::MethodNotFound(request.method.clone()));
        };

        if method.is_notification() {
            tracing::debug!("{} sent as a request (id {})", method.as_str(), request.id);
        } else {
            tracing::debug!("Dispatching {} (id {})", method.as_str(), request.id);
        }
        let params = request.params.clone();

        match method {
            Method::Initialize => self.handle_initialize(params),

            Method::Initialized => {
                negotiation::acknowledge(&self.session);
                Ok(empty_result())
            }
            Method::Cancelled => {
                self.handle_cancelled(params).await;
                Ok(empty_result())
            }

            Method::ResourcesList => self.handle_resources_list().await,
            Method::ResourcesRead => self.handle_resources_read(params, ctx).await,

            Method::ToolsList => self.handle_tools_list().await,
            Method::ToolsCall => self.handle_tools_call(params, ctx).await,

            Method::PromptsList => self.handle_prompts_list().await,
            Method::PromptsGet => self.handle_prompts_get(params, ctx).await,
        }
    }

    async fn handle_notification(&self, notification: JsonRpcNotification) {
        if let Err(e) = validate_notification(&notification) {
            tracing::warn!("Dropping notification {}: {e}", notification.method);
            return;
        }
        match Method::from_name(&notification.method) {
            Some(Method::Initialized) => negotiation::acknowledge(&self.session),
            Some(Method::Cancelled) => self.handle_cancelled(notification.params).await,
            _ => {
                tracing::debug!("Ignoring notification: {}", notification.method);
            }
        }
    }

    async fn handle_cancelled(&self, params: Option<Value>) {
        let cancel: CancelledParams = match params.map(serde_json::from_value).transpose() {
            Ok(Some(p)) => p,
            _ => {
                tracing::debug!("Ignoring malformed cancellation notification");
                return;
            }
        };

        let key = cancel.request_id.correlation_key();
        match self.in_flight.lock().await.get(&key) {
            Some(running) => {
                tracing::info!(
                    "Cancelling request {} ({})",
                    cancel.request_id,
                    cancel.reason.as_deref().unwrap_or("no reason given")
                );
                for entry in running {
                    entry.token.cancel();
                }
            }
            None => tracing::debug!("Cancellation for unknown request {}", cancel.request_id),
        }
    }

    /// Drop this request's entry, leaving any other request under the same key.
    async fn finish(&self, key: &str, seq: u64) {
        let mut in_flight = self.in_flight.lock().await;
        if let Some(running) = in_flight.get_mut(key) {
            running.retain(|entry| entry.seq != seq);
            if running.is_empty() {
                in_flight.remove(key);
            }
        }
    }

    fn handle_initialize(&self, params: Option<Value>) -> McpResult<Value> {
        let init_params: InitializeParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .unwrap_or_default();

        to_result(negotiation::negotiate(&self.session, init_params))
    }

    async fn handle_tools_list(&self) -> McpResult<Value> {
        to_result(ToolListResult {
            tools: self.session.tools().list_tools().await,
        })
    }

    async fn handle_tools_call(&self, params: Option<Value>, ctx: RequestContext) -> McpResult<Value> {
        let call: ToolCallParams = parse_params(params, "Tool call params required")?;

        let entry = self
            .session
            .tools()
            .lookup(&call.name)
            .await
            .ok_or_else(|| McpError::ToolNotFound(call.name.clone()))?;

        let arguments = call.arguments.unwrap_or_default();
        let result = match guard(entry.handler.call(ctx, arguments)).await {
            Ok(content) => ToolCallResult::success(content),
            Err(e) => {
                tracing::warn!("Tool {} reported failure: {e:#}", call.name);
                ToolCallResult::error(format!("Error: {e:#}"))
            }
        };

        to_result(result)
    }

    async fn handle_resources_list(&self) -> McpResult<Value> {
        to_result(ResourceListResult {
            resources: self.session.resources().list_resources().await,
        })
    }

    async fn handle_resources_read(
        &self,
        params: Option<Value>,
        ctx: RequestContext,
    ) -> McpResult<Value> {
        let read: ResourceReadParams = parse_params(params, "Resource read params required")?;
        if read.uri.is_empty() {
            return Err(McpError::InvalidParams("Invalid URI".to_string()));
        }

        let resolved = self
            .session
            .resources()
            .resolve(&read.uri)
            .await
            .ok_or_else(|| McpError::ResourceNotFound(read.uri.clone()))?;

        let (outcome, mime_type) = match resolved {
            ResolvedResource::Static(entry) => (
                guard(entry.handler.read(ctx, read.uri.clone())).await,
                entry.mime_type.clone(),
            ),
            ResolvedResource::Template(entry, template_params) => (
                guard(entry.handler.read(ctx, read.uri.clone(), template_params)).await,
                entry.mime_type.clone(),
            ),
        };

        let mut content = outcome
            .map_err(|e| McpError::InternalError(format!("Error reading resource: {e:#}")))?;
        if content.mime_type.is_none() {
            content.mime_type = mime_type;
        }

        to_result(ReadResourceResult {
            contents: vec![content],
        })
    }

    async fn handle_prompts_list(&self) -> McpResult<Value> {
        to_result(PromptListResult {
            prompts: self.session.prompts().list_prompts().await,
        })
    }

    async fn handle_prompts_get(&self, params: Option<Value>, ctx: RequestContext) -> McpResult<Value> {
        let get: PromptGetParams = parse_params(params, "Prompt get params required")?;

        let entry = self
            .session
            .prompts()
            .lookup(&get.name)
            .await
            .ok_or_else(|| McpError::PromptNotFound(get.name.clone()))?;

        let arguments = get.arguments.unwrap_or_default();
        if let Some(missing) = entry.missing_argument(&arguments) {
            return Err(McpError::InvalidParams(format!(
                "Missing required argument '{}' for prompt '{}'",
                missing.name, entry.name
            )));
        }

        let messages = guard(entry.handler.get(ctx, arguments))
            .await
            .map_err(|e| McpError::InternalError(format!("{e:#}")))?;

        to_result(PromptGetResult {
            description: entry.description.clone(),
            messages,
        })
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>, missing: &str) -> McpResult<T> {
    params
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?
        .ok_or_else(|| McpError::InvalidParams(missing.to_string()))
}

fn to_result(value: impl Serialize) -> McpResult<Value> {
    serde_json::to_value(value).map_err(|e| McpError::InternalError(e.to_string()))
}

fn empty_result() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Run a capability handler, turning a panic into an ordinary error.
async fn guard<T>(fut: impl Future<Output = anyhow::Result<T>>) -> anyhow::Result<T> {
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!("Capability handler panicked: {message}");
            Err(anyhow::anyhow!("handler panicked: {message}"))
        }
    }
}
