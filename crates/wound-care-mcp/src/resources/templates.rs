//! Resource URI templates and static resource definitions.

use crate::types::{ResourceDefinition, ResourceTemplateDefinition};

pub fn list_templates() -> Vec<ResourceTemplateDefinition> {
    vec![ResourceTemplateDefinition {
        uri_template: "treatment://{wound_type}".to_string(),
        name: "Treatment Plan".to_string(),
        description: Some("Care instructions for one wound type".to_string()),
        mime_type: Some("text/markdown".to_string()),
    }]
}

pub fn list_resources() -> Vec<ResourceDefinition> {
    vec![ResourceDefinition {
        uri: "treatment://index".to_string(),
        name: "Wound Types".to_string(),
        description: Some("Wound types with a treatment plan in the knowledge base".to_string()),
        mime_type: Some("application/json".to_string()),
    }]
}
