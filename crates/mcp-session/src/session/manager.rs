//! Session state: identity, capabilities, registries, and the handshake flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::prompts::{PromptEntry, PromptRegistry};
use crate::protocol::Notifier;
use crate::resources::{ResourceEntry, ResourceRegistry, ResourceTemplateEntry};
use crate::tools::{ToolEntry, ToolRegistry};
use crate::transport::Transport;
use crate::types::{
    CapabilitySet, Implementation, InitializeResult, LogLevel, McpError, McpResult,
    ServerIdentity,
};

/// Tunables for how a session serves requests.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Upper bound on concurrently running requests. `None` means unbounded.
    pub max_in_flight: Option<usize>,
    /// Free-form usage hints returned from `initialize`.
    pub instructions: Option<String>,
}

/// Everything one server exposes to one peer.
///
/// Build it once, register capabilities (before or while serving), then hand
/// an `Arc<Session>` to [`Session::serve`].
pub struct Session {
    id: Uuid,
    identity: ServerIdentity,
    capabilities: CapabilitySet,
    options: SessionOptions,
    resources: ResourceRegistry,
    tools: ToolRegistry,
    prompts: PromptRegistry,
    transport: RwLock<Option<Arc<dyn Transport>>>,
    initialized: AtomicBool,
    client: OnceLock<Implementation>,
}

impl Session {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity: Implementation::new(name, version),
            capabilities: CapabilitySet::default(),
            options: SessionOptions::default(),
            resources: ResourceRegistry::new(),
            tools: ToolRegistry::new(),
            prompts: PromptRegistry::new(),
            transport: RwLock::new(None),
            initialized: AtomicBool::new(false),
            client: OnceLock::new(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn identity(&self) -> &ServerIdentity {
        &self.identity
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn prompts(&self) -> &PromptRegistry {
        &self.prompts
    }

    // ── handshake ──

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Flip to initialized. Returns `true` only for the call that made the transition.
    pub(crate) fn mark_initialized(&self, client: Implementation) -> bool {
        let first = self
            .initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if first {
            let _ = self.client.set(client);
        }
        first
    }

    /// The client identity from the first `initialize`.
    pub fn client_info(&self) -> Option<&Implementation> {
        self.client.get()
    }

    pub fn initialize_result(&self) -> InitializeResult {
        let mut result = InitializeResult::new(self.identity.clone(), self.capabilities.clone());
        result.instructions = self.options.instructions.clone();
        result
    }

    // ── registration ──

    pub async fn add_resource(&self, entry: ResourceEntry) {
        self.resources.register(entry).await;
    }

    pub async fn add_resource_template(&self, entry: ResourceTemplateEntry) {
        self.resources.register_template(entry).await;
    }

    pub async fn add_tool(&self, entry: ToolEntry) {
        self.tools.register(entry).await;
    }

    pub async fn add_prompt(&self, entry: PromptEntry) {
        self.prompts.register(entry).await;
    }

    // ── transport ──

    pub(crate) async fn attach(&self, transport: Arc<dyn Transport>) {
        *self.transport.write().await = Some(transport);
    }

    pub(crate) async fn detach(&self) {
        self.transport.write().await.take();
    }

    pub async fn is_connected(&self) -> bool {
        self.transport.read().await.is_some()
    }

    /// A notification sender bound to the attached transport.
    pub async fn notifier(&self) -> McpResult<Notifier> {
        self.transport
            .read()
            .await
            .clone()
            .map(Notifier::new)
            .ok_or_else(|| McpError::Transport("no transport attached".to_string()))
    }

    // ── notifications ──

    pub async fn notify_resources_list_changed(&self) -> McpResult<()> {
        self.notifier().await?.resources_list_changed().await
    }

    pub async fn notify_tools_list_changed(&self) -> McpResult<()> {
        self.notifier().await?.tools_list_changed().await
    }

    pub async fn notify_prompts_list_changed(&self) -> McpResult<()> {
        self.notifier().await?.prompts_list_changed().await
    }

    pub async fn notify_resource_updated(&self, uri: &str) -> McpResult<()> {
        self.notifier().await?.resource_updated(uri).await
    }

    pub async fn log_message(
        &self,
        level: LogLevel,
        data: impl Serialize,
        logger: Option<&str>,
    ) -> McpResult<()> {
        self.notifier().await?.log_message(level, data, logger).await
    }
}
