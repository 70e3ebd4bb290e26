//! Resources: static URIs and URI templates, plus the handlers that read them.

pub mod registry;
pub mod template;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::registry::Keyed;
use crate::types::{McpResult, ResourceContent, ResourceDefinition};

pub use registry::ResourceRegistry;
pub use template::{TemplateParams, UriTemplate};

/// Reads a static resource.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    async fn read(&self, ctx: RequestContext, uri: String) -> anyhow::Result<ResourceContent>;
}

/// Reads a resource addressed through a URI template.
#[async_trait]
pub trait ResourceTemplateHandler: Send + Sync {
    async fn read(
        &self,
        ctx: RequestContext,
        uri: String,
        params: TemplateParams,
    ) -> anyhow::Result<ResourceContent>;
}

#[async_trait]
impl<F, Fut> ResourceHandler for F
where
    F: Fn(RequestContext, String) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<ResourceContent>> + Send,
{
    async fn read(&self, ctx: RequestContext, uri: String) -> anyhow::Result<ResourceContent> {
        (self)(ctx, uri).await
    }
}

#[async_trait]
impl<F, Fut> ResourceTemplateHandler for F
where
    F: Fn(RequestContext, String, TemplateParams) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<ResourceContent>> + Send,
{
    async fn read(
        &self,
        ctx: RequestContext,
        uri: String,
        params: TemplateParams,
    ) -> anyhow::Result<ResourceContent> {
        (self)(ctx, uri, params).await
    }
}

/// A static resource, keyed by its exact URI.
pub struct ResourceEntry {
    pub uri: String,
    pub name: String,
    pub description: Option<String>,
    pub mime_type: Option<String>,
    pub handler: Arc<dyn ResourceHandler>,
}

impl ResourceEntry {
    pub fn new(
        uri: impl Into<String>,
        name: impl Into<String>,
        handler: impl ResourceHandler + 'static,
    ) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            description: None,
            mime_type: None,
            handler: Arc::new(handler),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn definition(&self) -> ResourceDefinition {
        ResourceDefinition {
            uri: self.uri.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            mime_type: self.mime_type.clone(),
        }
    }
}

impl Keyed for ResourceEntry {
    fn key(&self) -> &str {
        &self.uri
    }
}

/// A dynamic resource, keyed by its literal pattern string.
pub struct ResourceTemplateEntry {
    pub template: UriTemplate,
    pub name: String,
    pub description: Option<String>,
    pub mime_type: Option<String>,
    pub handler: Arc<dyn ResourceTemplateHandler>,
}

impl ResourceTemplateEntry {
    /// Compiles `pattern`; fails on malformed placeholders.
    pub fn new(
        pattern: &str,
        name: impl Into<String>,
        handler: impl ResourceTemplateHandler + 'static,
    ) -> McpResult<Self> {
        Ok(Self {
            template: UriTemplate::compile(pattern)?,
            name: name.into(),
            description: None,
            mime_type: None,
            handler: Arc::new(handler),
        })
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Listed alongside static resources, with the pattern in the `uri` field.
    pub fn definition(&self) -> ResourceDefinition {
        ResourceDefinition {
            uri: self.template.pattern().to_string(),
            name: self.name.clone(),
            description: self.description.clone(),
            mime_type: self.mime_type.clone(),
        }
    }
}

impl Keyed for ResourceTemplateEntry {
    fn key(&self) -> &str {
        self.template.pattern()
    }
}
