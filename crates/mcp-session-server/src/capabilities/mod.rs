//! The capabilities this server ships: one tool, one prompt, two static
//! resources, and one resource template.

pub mod calculator;
pub mod greeting;
pub mod resources;

use mcp_session::types::McpResult;
use mcp_session::Session;

/// Register every bundled capability on `session`.
pub async fn register_all(session: &Session) -> McpResult<()> {
    session.add_tool(calculator::entry()).await;
    session.add_prompt(greeting::entry()).await;

    session
        .add_resource(resources::server_info(session.identity().clone()))
        .await;
    session.add_resource(resources::current_time()).await;
    session
        .add_resource_template(resources::user_profile()?)
        .await;

    tracing::debug!(
        "Registered {} tools, {} prompts, {} resources, {} templates",
        session.tools().len().await,
        session.prompts().len().await,
        session.resources().resource_count().await,
        session.resources().template_count().await
    );
    Ok(())
}
