//! Tool registration and lookup.

use std::sync::Arc;

use crate::registry::Registry;
use crate::types::ToolDefinition;

use super::ToolEntry;

#[derive(Default)]
pub struct ToolRegistry {
    tools: Registry<ToolEntry>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, entry: ToolEntry) -> bool {
        tracing::debug!("Registering tool {}", entry.name);
        self.tools.register(entry).await
    }

    pub async fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools.list().await.iter().map(|e| e.definition()).collect()
    }

    pub async fn lookup(&self, name: &str) -> Option<Arc<ToolEntry>> {
        self.tools.lookup(name).await
    }

    pub async fn len(&self) -> usize {
        self.tools.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.tools.is_empty().await
    }
}
