//! Tool: describe_wound — Short free-text description of a wound photo.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::service::WoundService;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
struct DescribeParams {
    image_path: String,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "describe_wound".to_string(),
        description: Some(
            "Describe a wound: appearance, colour, surrounding skin, and visible signs of infection"
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "image_path": { "type": "string", "description": "Path to the wound photo" }
            },
            "required": ["image_path"]
        }),
    }
}

pub async fn execute(args: Value, service: &Arc<WoundService>) -> McpResult<ToolCallResult> {
    let params: DescribeParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    match service
        .analyzer()
        .describe(Path::new(&params.image_path))
        .await
    {
        Ok(description) => Ok(ToolCallResult::json(&json!({ "description": description }))),
        Err(e) => Ok(ToolCallResult::error(format!("Description failed: {e}"))),
    }
}
