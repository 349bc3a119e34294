//! Tool: sum — Add two integers. Used to check connectivity.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
struct SumParams {
    a: i64,
    b: i64,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "sum".to_string(),
        description: Some("Add two numbers together.".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "a": { "type": "integer" },
                "b": { "type": "integer" }
            },
            "required": ["a", "b"]
        }),
    }
}

pub async fn execute(args: Value) -> McpResult<ToolCallResult> {
    let params: SumParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let result = params
        .a
        .checked_add(params.b)
        .ok_or_else(|| McpError::InvalidParams("Sum overflows a 64-bit integer".to_string()))?;

    Ok(ToolCallResult::json(&json!({ "result": result })))
}
