//! Tool: segment_wound — Segment a wound photo and measure its area.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::service::WoundService;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
struct SegmentParams {
    image_path: String,
    #[serde(default)]
    conf_thresh: Option<f32>,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "segment_wound".to_string(),
        description: Some(
            "Segment the wound in an image and return its area in cm² with an annotated image. \
             When nothing is detected, returns an infection screening instead."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "image_path": { "type": "string", "description": "Path to the wound photo" },
                "conf_thresh": {
                    "type": "number",
                    "minimum": 0,
                    "maximum": 1,
                    "default": 0.1,
                    "description": "Minimum detection confidence"
                }
            },
            "required": ["image_path"]
        }),
    }
}

pub async fn execute(args: Value, service: &Arc<WoundService>) -> McpResult<ToolCallResult> {
    let params: SegmentParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let threshold = params
        .conf_thresh
        .unwrap_or_else(|| service.confidence_threshold());
    if !(0.0..=1.0).contains(&threshold) {
        return Err(McpError::InvalidParams(format!(
            "'conf_thresh' must be within [0, 1], got {threshold}"
        )));
    }

    match service
        .analyzer()
        .segment(Path::new(&params.image_path), threshold)
        .await
    {
        Ok(report) => Ok(ToolCallResult::json(&report)),
        Err(e) => {
            tracing::warn!("segment_wound failed for {}: {e}", params.image_path);
            Ok(ToolCallResult::error(format!("Segmentation failed: {e}")))
        }
    }
}
