//! MCP session engine — serve resources, tools, and prompts to one peer over
//! a line-delimited JSON-RPC 2.0 transport.

pub mod context;
pub mod prompts;
pub mod protocol;
pub mod registry;
pub mod resources;
pub mod session;
pub mod tools;
pub mod transport;
pub mod types;

/// A JSON object, as carried in tool and prompt arguments.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

pub use context::RequestContext;
pub use prompts::{PromptEntry, PromptHandler};
pub use protocol::{Notifier, ProtocolHandler};
pub use resources::{
    ResourceEntry, ResourceHandler, ResourceTemplateEntry, ResourceTemplateHandler,
    TemplateParams, UriTemplate,
};
pub use session::{Session, SessionOptions};
pub use tools::{ToolEntry, ToolHandler};
pub use transport::{StdioTransport, StreamTransport, Transport};
