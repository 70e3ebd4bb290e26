//! Prompts: named message templates expanded with caller-supplied arguments.

pub mod registry;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::registry::Keyed;
use crate::types::{PromptArgument, PromptDefinition, PromptMessage};
use crate::JsonObject;

pub use registry::PromptRegistry;

/// Expands a prompt. An `Err` becomes a standard error response.
#[async_trait]
pub trait PromptHandler: Send + Sync {
    async fn get(&self, ctx: RequestContext, arguments: JsonObject) -> anyhow::Result<Vec<PromptMessage>>;
}

#[async_trait]
impl<F, Fut> PromptHandler for F
where
    F: Fn(RequestContext, JsonObject) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Vec<PromptMessage>>> + Send,
{
    async fn get(&self, ctx: RequestContext, arguments: JsonObject) -> anyhow::Result<Vec<PromptMessage>> {
        (self)(ctx, arguments).await
    }
}

pub struct PromptEntry {
    pub name: String,
    pub description: Option<String>,
    pub arguments: Vec<PromptArgument>,
    pub handler: Arc<dyn PromptHandler>,
}

impl PromptEntry {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        arguments: Vec<PromptArgument>,
        handler: impl PromptHandler + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            arguments,
            handler: Arc::new(handler),
        }
    }

    /// The first required argument absent from `supplied`, if any.
    pub fn missing_argument<'a>(&'a self, supplied: &JsonObject) -> Option<&'a PromptArgument> {
        self.arguments
            .iter()
            .find(|arg| arg.required && !supplied.contains_key(&arg.name))
    }

    pub fn definition(&self) -> PromptDefinition {
        PromptDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            arguments: self.arguments.clone(),
        }
    }
}

impl Keyed for PromptEntry {
    fn key(&self) -> &str {
        &self.name
    }
}
