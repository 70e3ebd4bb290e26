//! Configuration loading and resolution.
//!
//! Every setting resolves the same way: explicit CLI flag, then environment
//! variable, then built-in default.

pub const DEFAULT_SERVER_NAME: &str = "mcp-session-server";

pub const ENV_SERVER_NAME: &str = "MCP_SESSION_NAME";
pub const ENV_MAX_IN_FLIGHT: &str = "MCP_SESSION_MAX_IN_FLIGHT";

/// Settings for one server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub max_in_flight: Option<usize>,
}

impl ServerConfig {
    pub fn resolve(name: Option<&str>, max_in_flight: Option<usize>) -> Self {
        Self::resolve_with(name, max_in_flight, |key| std::env::var(key).ok())
    }

    fn resolve_with(
        name: Option<&str>,
        max_in_flight: Option<usize>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        Self {
            name: resolve_server_name(name, &env),
            version: env!("CARGO_PKG_VERSION").to_string(),
            max_in_flight: resolve_max_in_flight(max_in_flight, &env),
        }
    }
}

fn resolve_server_name(explicit: Option<&str>, env: impl Fn(&str) -> Option<String>) -> String {
    if let Some(name) = explicit {
        return name.to_string();
    }

    match env(ENV_SERVER_NAME) {
        Some(name) if !name.trim().is_empty() => name,
        _ => DEFAULT_SERVER_NAME.to_string(),
    }
}

/// `0` from any source means unbounded.
fn resolve_max_in_flight(
    explicit: Option<usize>,
    env: impl Fn(&str) -> Option<String>,
) -> Option<usize> {
    let limit = explicit.or_else(|| {
        let raw = env(ENV_MAX_IN_FLIGHT)?;
        match raw.trim().parse::<usize>() {
            Ok(limit) => Some(limit),
            Err(_) => {
                tracing::warn!("Ignoring {ENV_MAX_IN_FLIGHT}={raw:?}: not a non-negative integer");
                None
            }
        }
    })?;
    (limit > 0).then_some(limit)
}
