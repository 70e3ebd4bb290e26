//! Resource registration and URI resolution.

use std::sync::Arc;

use crate::registry::Registry;
use crate::types::ResourceDefinition;

use super::{ResourceEntry, ResourceTemplateEntry, TemplateParams};

/// What a `resources/read` URI resolved to.
pub enum ResolvedResource {
    Static(Arc<ResourceEntry>),
    Template(Arc<ResourceTemplateEntry>, TemplateParams),
}

/// Static resources and resource templates, held in two independent registries.
#[derive(Default)]
pub struct ResourceRegistry {
    resources: Registry<ResourceEntry>,
    templates: Registry<ResourceTemplateEntry>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, entry: ResourceEntry) -> bool {
        tracing::debug!("Registering resource {}", entry.uri);
        self.resources.register(entry).await
    }

    pub async fn register_template(&self, entry: ResourceTemplateEntry) -> bool {
        tracing::debug!("Registering resource template {}", entry.template.pattern());
        self.templates.register(entry).await
    }

    /// Static resources first, then templates (pattern in the `uri` field).
    pub async fn list_resources(&self) -> Vec<ResourceDefinition> {
        let mut definitions: Vec<ResourceDefinition> =
            self.resources.list().await.iter().map(|e| e.definition()).collect();
        definitions.extend(self.templates.list().await.iter().map(|e| e.definition()));
        definitions
    }

    pub async fn lookup(&self, uri: &str) -> Option<Arc<ResourceEntry>> {
        self.resources.lookup(uri).await
    }

    /// Try every template against `uri`.
    ///
    /// Templates are tried in registration order. When two templates can both
    /// match a URI, which one wins is not part of the contract.
    pub async fn match_template(
        &self,
        uri: &str,
    ) -> Option<(Arc<ResourceTemplateEntry>, TemplateParams)> {
        self.templates
            .find_map(|entry| entry.template.match_uri(uri).map(|p| (entry.clone(), p)))
            .await
    }

    /// Exact URI first; templates only on a miss.
    pub async fn resolve(&self, uri: &str) -> Option<ResolvedResource> {
        if let Some(entry) = self.lookup(uri).await {
            return Some(ResolvedResource::Static(entry));
        }
        self.match_template(uri)
            .await
            .map(|(entry, params)| ResolvedResource::Template(entry, params))
    }

    pub async fn resource_count(&self) -> usize {
        self.resources.len().await
    }

    pub async fn template_count(&self) -> usize {
        self.templates.len().await
    }
}
