//! Tool: diagnose_wound — Screen a wound photo for infection.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::service::WoundService;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
struct DiagnoseParams {
    image_path: String,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "diagnose_wound".to_string(),
        description: Some(
            "Ask the vision-language model whether a wound looks infected \
             (infected, not_infected, or undetermined)"
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
    let params: DiagnoseParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    match service
        .analyzer()
        .diagnose(Path::new(&params.image_path))
        .await
    {
        Ok(diagnosis) => Ok(ToolCallResult::json(&json!({ "diagnosis": diagnosis }))),
        Err(e) => Ok(ToolCallResult::error(format!("Diagnosis failed: {e}"))),
    }
}
