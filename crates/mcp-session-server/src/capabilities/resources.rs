//! Resources: info://server, time://now, and the user://{userId} template.

use serde_json::json;

use mcp_session::types::{Implementation, McpResult, ResourceContent, MCP_VERSION};
use mcp_session::{RequestContext, ResourceEntry, ResourceTemplateEntry, TemplateParams};

const JSON_MIME: &str = "application/json";

pub const SERVER_INFO_URI: &str = "info://server";
pub const TIME_URI: &str = "time://now";
pub const USER_TEMPLATE: &str = "user://{userId}";

pub fn server_info(identity: Implementation) -> ResourceEntry {
    ResourceEntry::new(
        SERVER_INFO_URI,
        "Server information",
        move |_ctx: RequestContext, uri: String| {
            let identity = identity.clone();
            async move {
                let body = json!({
                    "name": identity.name,
                    "version": identity.version,
                    "protocolVersion": MCP_VERSION,
                });
                Ok::<_, anyhow::Error>(ResourceContent::text(
                    uri,
                    None,
                    serde_json::to_string_pretty(&body)?,
                ))
            }
        },
    )
    .description("Name, version, and protocol version of this server")
    .mime_type(JSON_MIME)
}

pub fn current_time() -> ResourceEntry {
    ResourceEntry::new(TIME_URI, "Current time", read_time)
        .description("The server's current UTC time in RFC 3339 format")
        .mime_type("text/plain")
}

async fn read_time(_ctx: RequestContext, uri: String) -> anyhow::Result<ResourceContent> {
    Ok(ResourceContent::text(uri, None, chrono::Utc::now().to_rfc3339()))
}

pub fn user_profile() -> McpResult<ResourceTemplateEntry> {
    Ok(ResourceTemplateEntry::new(USER_TEMPLATE, "User profile", read_user)?
        .description("Profile of the user with the given id")
        .mime_type(JSON_MIME))
}

async fn read_user(
    _ctx: RequestContext,
    uri: String,
    params: TemplateParams,
) -> anyhow::Result<ResourceContent> {
    let user_id = params
        .get("userId")
        .ok_or_else(|| anyhow::anyhow!("template matched without a userId"))?;

    let body = json!({
        "id": user_id,
        "name": format!("User {user_id}"),
    });
    Ok(ResourceContent::text(uri, None, serde_json::to_string_pretty(&body)?))
}
