//! Tools: named operations the peer can invoke with JSON arguments.

pub mod registry;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::context::RequestContext;
use crate::registry::Keyed;
use crate::types::{ToolContent, ToolDefinition};
use crate::JsonObject;

pub use registry::ToolRegistry;

/// Runs a tool. An `Err` is reported to the peer as a failed tool result,
/// not as a protocol error.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, ctx: RequestContext, arguments: JsonObject) -> anyhow::Result<Vec<ToolContent>>;
}

#[async_trait]
impl<F, Fut> ToolHandler for F
where
    F: Fn(RequestContext, JsonObject) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Vec<ToolContent>>> + Send,
{
    async fn call(&self, ctx: RequestContext, arguments: JsonObject) -> anyhow::Result<Vec<ToolContent>> {
        (self)(ctx, arguments).await
    }
}

pub struct ToolEntry {
    pub name: String,
    pub description: Option<String>,
    /// Opaque JSON Schema document describing the arguments.
    pub input_schema: Value,
    pub handler: Arc<dyn ToolHandler>,
}

impl ToolEntry {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        handler: impl ToolHandler + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            input_schema,
            handler: Arc::new(handler),
        }
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
        }
    }
}

impl Keyed for ToolEntry {
    fn key(&self) -> &str {
        &self.name
    }
}
