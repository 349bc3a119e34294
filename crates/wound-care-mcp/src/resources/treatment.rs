//! Resources: treatment://{wound_type} and treatment://index.

use std::path::Path;

use serde_json::json;
use wound_care::{load_knowledge_base, treatment_plan, wound_types};

use crate::types::{McpResult, ReadResourceResult, ResourceContent};

/// Path segment taken by `treatment://index`. A knowledge-base entry with this
/// key cannot be addressed through the plan template.
pub const INDEX_KEY: &str = "index";

pub fn read_plan(uri: &str, wound_type: &str, knowledge_base: &Path) -> McpResult<ReadResourceResult> {
    Ok(ReadResourceResult {
        contents: vec![ResourceContent {
            uri: uri.to_string(),
            mime_type: Some("text/markdown".to_string()),
            text: Some(treatment_plan(wound_type, knowledge_base)),
        }],
    })
}

/// The index answers with text too when the knowledge base cannot be read.
pub fn read_index(uri: &str, knowledge_base: &Path) -> McpResult<ReadResourceResult> {
    let (mime, text) = match load_knowledge_base(knowledge_base) {
        Ok(kb) => {
            let mut types = wound_types(&kb);
            if types.iter().any(|t| t == INDEX_KEY) {
                tracing::warn!(
                    "Knowledge base entry \"{INDEX_KEY}\" is shadowed by {uri} and is not listed"
                );
                types.retain(|t| t != INDEX_KEY);
            }
            let body = json!({ "count": types.len(), "wound_types": types });
            (
                "application/json",
                serde_json::to_string_pretty(&body)?,
            )
        }
        Err(e) => ("text/plain", format!("Error loading treatment plan: {e}")),
    };

    Ok(ReadResourceResult {
        contents: vec![ResourceContent {
            uri: uri.to_string(),
            mime_type: Some(mime.to_string()),
            text: Some(text),
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn kb_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"burn": {{"name": "Minor Burn"}}, "abrasion": {{"name": "Abrasion"}}}}"#
        )
        .unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_index_lists_sorted_types() {
        let file = kb_file();
        let result = read_index("treatment://index", file.path()).unwrap();
        let content = &result.contents[0];
        assert_eq!(content.mime_type.as_deref(), Some("application/json"));

        let value: serde_json::Value =
            serde_json::from_str(content.text.as_deref().unwrap()).unwrap();
        assert_eq!(value["count"], 2);
        assert_eq!(value["wound_types"], json!(["abrasion", "burn"]));
    }

    #[test]
    fn test_index_omits_reserved_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"index": {{"name": "Index Finger Cut"}}, "burn": {{"name": "Minor Burn"}}}}"#
        )
        .unwrap();
        file.flush().unwrap();

        let result = read_index("treatment://index", file.path()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(result.contents[0].text.as_deref().unwrap()).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["wound_types"], json!(["burn"]));
    }

    #[test]
    fn test_index_missing_file_is_text() {
        let result = read_index("treatment://index", Path::new("/nonexistent/kb.json")).unwrap();
        let text = result.contents[0].text.as_deref().unwrap();
        assert!(text.starts_with("Error loading treatment plan:"));
    }

    #[test]
    fn test_plan_matches_tool_text() {
        let file = kb_file();
        let result = read_plan("treatment://burn", "burn", file.path()).unwrap();
        assert_eq!(
            result.contents[0].text.as_deref(),
            Some(treatment_plan("burn", file.path()).as_str())
        );
        assert_eq!(result.contents[0].uri, "treatment://burn");
    }
}
