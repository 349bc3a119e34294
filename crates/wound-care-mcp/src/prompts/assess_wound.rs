//! Prompt: assess_wound — Walk through a full assessment of one wound photo.

use std::path::Path;

use serde_json::Value;
use wound_care::capture::{image_to_base64, load_image};

use crate::types::{McpError, McpResult, PromptGetResult, PromptMessage, ToolContent};

pub fn expand(args: Value) -> McpResult<PromptGetResult> {
    let image_path = args
        .get("image_path")
        .and_then(|v| v.as_str())
        .ok_or_else(|| McpError::InvalidParams("'image_path' argument is required".to_string()))?;

    let text = format!(
        "Assess the wound in {image_path}.\n\n\
         Please:\n\
         1. Call segment_wound with image_path \"{image_path}\" to measure the wound area in cm²\n\
         2. If no wound is detected, report the infection screening from the result\n\
         3. Otherwise call diagnose_wound and describe_wound on the same image\n\
         4. Decide which wound type best matches and call get_treatment_plan for it\n\
         5. Summarise the area, infection status, and the next care steps"
    );

    let mut messages = vec![PromptMessage {
        role: "user".to_string(),
        content: ToolContent::Text { text },
    }];

    // Attach the photo when it can be read; the instructions stand on their own otherwise.
    match load_image(Path::new(image_path)).and_then(|img| image_to_base64(&img.to_rgb8())) {
        Ok(data) => messages.push(PromptMessage {
            role: "user".to_string(),
            content: ToolContent::Image {
                data,
                mime_type: "image/png".to_string(),
            },
        }),
        Err(e) => tracing::warn!("assess_wound: not attaching {image_path}: {e}"),
    }

    Ok(PromptGetResult {
        description: Some("Guide for measuring, screening, and planning care for a wound".to_string()),
        messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_requires_image_path() {
        assert!(matches!(
            expand(json!({})),
            Err(McpError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_attaches_readable_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wound.png");
        image::DynamicImage::new_rgb8(8, 8).save(&path).unwrap();

        let result = expand(json!({ "image_path": path.to_str().unwrap() })).unwrap();
        assert_eq!(result.messages.len(), 2);
        assert!(matches!(result.messages[1].content, ToolContent::Image { .. }));
    }

    #[test]
    fn test_missing_image_is_text_only() {
        let result = expand(json!({ "image_path": "/nonexistent/wound.png" })).unwrap();
        assert_eq!(result.messages.len(), 1);
        let ToolContent::Text { text } = &result.messages[0].content else {
            panic!("expected text content");
        };
        assert!(text.contains("segment_wound"));
    }
}
