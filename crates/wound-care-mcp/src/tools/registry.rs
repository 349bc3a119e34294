//! Tool registration and dispatch.

use std::sync::Arc;

use serde_json::Value;

use crate::service::WoundService;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::{describe_wound, diagnose_wound, get_treatment_plan, segment_wound, sum};

pub struct ToolRegistry;

impl ToolRegistry {
    pub fn list_tools() -> Vec<ToolDefinition> {
        vec![
            segment_wound::definition(),
            diagnose_wound::definition(),
            describe_wound::definition(),
            get_treatment_plan::definition(),
            sum::definition(),
        ]
    }

    pub async fn call(
        name: &str,
        arguments: Option<Value>,
        service: &Arc<WoundService>,
    ) -> McpResult<ToolCallResult> {
        let args = arguments.unwrap_or(Value::Object(serde_json::Map::new()));

        match name {
            "segment_wound" => segment_wound::execute(args, service).await,
            "diagnose_wound" => diagnose_wound::execute(args, service).await,
            "describe_wound" => describe_wound::execute(args, service).await,
            "get_treatment_plan" => get_treatment_plan::execute(args, service).await,
            "sum" => sum::execute(args).await,
            _ => Err(McpError::ToolNotFound(name.to_string())),
        }
    }
}
