//! Prompt registration and dispatch.

use std::sync::Arc;

use serde_json::Value;

use crate::service::WoundService;
use crate::types::{McpError, McpResult, PromptArgument, PromptDefinition, PromptGetResult};

use super::{assess_wound, treatment_guide};

pub struct PromptRegistry;

impl PromptRegistry {
    pub fn list_prompts() -> Vec<PromptDefinition> {
        vec![
            PromptDefinition {
                name: "assess_wound".to_string(),
                description: Some(
                    "Guide for measuring a wound, screening it for infection, and choosing a plan"
                        .to_string(),
                ),
                arguments: Some(vec![PromptArgument {
                    name: "image_path".to_string(),
                    description: Some("Path to the wound photo".to_string()),
                    required: true,
                }]),
            },
            PromptDefinition {
                name: "treatment_guide".to_string(),
                description: Some("Walk through the treatment plan for a wound type".to_string()),
                arguments: Some(vec![PromptArgument {
                    name: "wound_type".to_string(),
                    description: Some("Wound type key in the knowledge base".to_string()),
                    required: true,
                }]),
            },
        ]
    }

    pub async fn get(
        name: &str,
        arguments: Option<Value>,
        service: &Arc<WoundService>,
    ) -> McpResult<PromptGetResult> {
        let args = arguments.unwrap_or(Value::Object(serde_json::Map::new()));

        match name {
            "assess_wound" => assess_wound::expand(args),
            "treatment_guide" => treatment_guide::expand(args, service.knowledge_base()),
            _ => Err(McpError::PromptNotFound(name.to_string())),
        }
    }
}
