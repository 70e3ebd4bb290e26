//! MCP protocol handling — JSON-RPC dispatch, handshake, and notifications.

pub mod handler;
pub mod method;
pub mod negotiation;
pub mod notifier;
pub mod validator;

pub use handler::ProtocolHandler;
pub use method::Method;
pub use notifier::Notifier;
