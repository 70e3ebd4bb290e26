//! Server-initiated notifications: list changes, resource updates, log messages.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::transport::Transport;
use crate::types::*;

/// Fire-and-forget sender sharing the session's transport.
///
/// Notifications go through the same serialized write path as responses and
/// can be sent at any time, before or after the handshake.
#[derive(Clone)]
pub struct Notifier {
    transport: Arc<dyn Transport>,
}

impl Notifier {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn emit(&self, method: &str, params: Option<Value>) -> McpResult<()> {
        tracing::debug!("Sending notification {method}");
        let notification = JsonRpcNotification::new(method, params);
        self.transport.send(&notification.into()).await
    }

    pub async fn resources_list_changed(&self) -> McpResult<()> {
        self.emit(RESOURCES_LIST_CHANGED, None).await
    }

    pub async fn tools_list_changed(&self) -> McpResult<()> {
        self.emit(TOOLS_LIST_CHANGED, None).await
    }

    pub async fn prompts_list_changed(&self) -> McpResult<()> {
        self.emit(PROMPTS_LIST_CHANGED, None).await
    }

    pub async fn resource_updated(&self, uri: &str) -> McpResult<()> {
        let params = serde_json::to_value(ResourceUpdatedParams {
            uri: uri.to_string(),
        })?;
        self.emit(RESOURCE_UPDATED, Some(params)).await
    }

    pub async fn log_message(
        &self,
        level: LogLevel,
        data: impl Serialize,
        logger: Option<&str>,
    ) -> McpResult<()> {
        let params = serde_json::to_value(LogMessageParams {
            level,
            logger: logger.map(str::to_string),
            data: serde_json::to_value(data)?,
        })?;
        self.emit(LOG_MESSAGE, Some(params)).await
    }

    pub async fn log_debug(&self, data: impl Serialize, logger: Option<&str>) -> McpResult<()> {
        self.log_message(LogLevel::Debug, data, logger).await
    }

    pub async fn log_info(&self, data: impl Serialize, logger: Option<&str>) -> McpResult<()> {
        self.log_message(LogLevel::Info, data, logger).await
    }

    pub async fn log_warning(&self, data: impl Serialize, logger: Option<&str>) -> McpResult<()> {
        self.log_message(LogLevel::Warning, data, logger).await
    }

    pub async fn log_error(&self, data: impl Serialize, logger: Option<&str>) -> McpResult<()> {
        self.log_message(LogLevel::Error, data, logger).await
    }
}
