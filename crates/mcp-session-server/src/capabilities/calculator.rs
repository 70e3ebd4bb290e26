//! Tool: calculate — four-function arithmetic on two operands.

use anyhow::{bail, Context};
use serde_json::{json, Value};

use mcp_session::types::ToolContent;
use mcp_session::{JsonObject, RequestContext, ToolEntry};

pub const TOOL_NAME: &str = "calculate";

pub fn entry() -> ToolEntry {
    ToolEntry::new(TOOL_NAME, "Perform a calculation", input_schema(), calculate)
}

fn input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "operation": {
                "type": "string",
                "enum": ["add", "subtract", "multiply", "divide"],
                "description": "Operation to perform"
            },
            "a": {
                "type": "number",
                "description": "First operand"
            },
            "b": {
                "type": "number",
                "description": "Second operand"
            }
        },
        "required": ["operation", "a", "b"]
    })
}

async fn calculate(_ctx: RequestContext, args: JsonObject) -> anyhow::Result<Vec<ToolContent>> {
    let operation = args
        .get("operation")
        .and_then(Value::as_str)
        .context("'operation' must be a string")?;
    let a = operand(&args, "a")?;
    let b = operand(&args, "b")?;

    let result = evaluate(operation, a, b)?;
    tracing::debug!("calculate: {a} {operation} {b} = {result}");
    Ok(vec![ToolContent::text(format!("Result: {result}"))])
}

fn operand(args: &JsonObject, name: &str) -> anyhow::Result<f64> {
    args.get(name)
        .and_then(Value::as_f64)
        .with_context(|| format!("'{name}' must be a number"))
}

pub fn evaluate(operation: &str, a: f64, b: f64) -> anyhow::Result<f64> {
    Ok(match operation {
        "add" => a + b,
        "subtract" => a - b,
        "multiply" => a * b,
        "divide" => {
            if b == 0.0 {
                bail!("division by zero");
            }
            a / b
        }
        other => bail!("unknown operation: {other}"),
    })
}
