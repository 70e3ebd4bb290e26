//! The session: server identity, capability registries, handshake state, and
//! the receive loop that serves them over a transport.

pub mod manager;
pub mod serve;

pub use manager::{Session, SessionOptions};
