//! Prompt: greeting — ask the model to greet someone in a chosen style.

use anyhow::Context;
use serde_json::Value;

use mcp_session::types::{PromptArgument, PromptMessage};
use mcp_session::{JsonObject, PromptEntry, RequestContext};

pub const PROMPT_NAME: &str = "greeting";

pub fn entry() -> PromptEntry {
    PromptEntry::new(
        PROMPT_NAME,
        "Greet someone by name",
        vec![
            PromptArgument::required("name", "Who to greet"),
            PromptArgument::optional("style", "formal, casual, or pirate (default: casual)"),
        ],
        greeting,
    )
}

async fn greeting(_ctx: RequestContext, args: JsonObject) -> anyhow::Result<Vec<PromptMessage>> {
    let name = args
        .get("name")
        .and_then(Value::as_str)
        .context("'name' must be a string")?;

    let style = args.get("style").and_then(Value::as_str).unwrap_or("casual");
    let instruction = match style {
        "formal" => format!("Write a formal, respectful greeting addressed to {name}."),
        "casual" => format!("Say a friendly, casual hello to {name}."),
        "pirate" => format!("Greet {name} the way a pirate would."),
        other => anyhow::bail!("unknown greeting style: {other}"),
    };

    Ok(vec![PromptMessage::user(instruction)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp_session::types::{Role, ToolContent};
    use serde_json::json;

    async fn expand(args: Value) -> anyhow::Result<Vec<PromptMessage>> {
        greeting(RequestContext::detached(), args.as_object().unwrap().clone()).await
    }

    #[tokio::test]
    async fn test_default_style_is_casual() {
        let messages = expand(json!({ "name": "Ada" })).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(
            messages[0].content,
            ToolContent::text("Say a friendly, casual hello to Ada.")
        );
    }

    #[tokio::test]
    async fn test_unknown_style_fails() {
        let err = expand(json!({ "name": "Ada", "style": "haiku" })).await.unwrap_err();
        assert!(err.to_string().contains("haiku"));
    }

    #[test]
    fn test_only_name_is_required() {
        let entry = entry();
        let missing = entry.missing_argument(&JsonObject::new()).unwrap();
        assert_eq!(missing.name, "name");

        let supplied = json!({ "name": "Ada" });
        assert!(entry.missing_argument(supplied.as_object().unwrap()).is_none());
    }
}
