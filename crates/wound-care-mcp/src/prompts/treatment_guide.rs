//! Prompt: treatment_guide — Explain a treatment plan to the patient.

use std::path::Path;

use serde_json::Value;

use crate::types::{McpError, McpResult, PromptGetResult, PromptMessage, ToolContent};

pub fn expand(args: Value, knowledge_base: &Path) -> McpResult<PromptGetResult> {
    let wound_type = args
        .get("wound_type")
        .and_then(|v| v.as_str())
        .ok_or_else(|| McpError::InvalidParams("'wound_type' argument is required".to_string()))?;

    let plan = wound_care::treatment_plan(wound_type, knowledge_base);

    let text = format!(
        "Help me care for a {wound_type} wound using this plan:\n\n\
         {plan}\n\n\
         Please:\n\
         1. Explain each step in plain language, in order\n\
         2. List the materials I should have ready before starting\n\
         3. Point out the precautions and the signs that mean I should seek help\n\
         4. If the plan is not self-treatable, say so first"
    );

    Ok(PromptGetResult {
        description: Some(format!("Treatment walkthrough for {wound_type}")),
        messages: vec![PromptMessage {
            role: "user".to_string(),
            content: ToolContent::Text { text },
        }],
    })
}
