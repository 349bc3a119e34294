//! Tool: get_treatment_plan — Render care instructions for a wound type.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::service::WoundService;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
struct PlanParams {
    wound_type: String,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "get_treatment_plan".to_string(),
        description: Some(
            "Get the treatment plan for a wound type as markdown: materials, ordered steps, \
             precautions, and when to seek help"
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "wound_type": { "type": "string", "description": "Wound type key, e.g. 'abrasion'" }
            },
            "required": ["wound_type"]
        }),
    }
}

pub async fn execute(args: Value, service: &Arc<WoundService>) -> McpResult<ToolCallResult> {
    let params: PlanParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let text = wound_care::treatment_plan(&params.wound_type, service.knowledge_base());
    Ok(ToolCallResult::text(text))
}
