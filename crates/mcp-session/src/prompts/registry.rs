//! Prompt registration and lookup.

use std::sync::Arc;

use crate::registry::Registry;
use crate::types::PromptDefinition;

use super::PromptEntry;

#[derive(Default)]
pub struct PromptRegistry {
    prompts: Registry<PromptEntry>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, entry: PromptEntry) -> bool {
        tracing::debug!("Registering prompt {}", entry.name);
        self.prompts.register(entry).await
    }

    pub async fn list_prompts(&self) -> Vec<PromptDefinition> {
        self.prompts.list().await.iter().map(|e| e.definition()).collect()
    }

    pub async fn lookup(&self, name: &str) -> Option<Arc<PromptEntry>> {
        self.prompts.lookup(name).await
    }

    pub async fn len(&self) -> usize {
        self.prompts.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.prompts.is_empty().await
    }
}
