//! Resource registration and dispatch.

use std::sync::Arc;

use crate::service::WoundService;
use crate::types::{
    McpError, McpResult, ReadResourceResult, ResourceDefinition, ResourceTemplateDefinition,
};

use super::{templates, treatment};

const INDEX_URI: &str = "treatment://index";

pub struct ResourceRegistry;

impl ResourceRegistry {
    pub fn list_templates() -> Vec<ResourceTemplateDefinition> {
        templates::list_templates()
    }

    pub fn list_resources() -> Vec<ResourceDefinition> {
        templates::list_resources()
    }

    pub async fn read(uri: &str, service: &Arc<WoundService>) -> McpResult<ReadResourceResult> {
        if uri == INDEX_URI {
            treatment::read_index(uri, service.knowledge_base())
        } else if let Some(wound_type) = uri.strip_prefix("treatment://") {
            if wound_type.is_empty() || wound_type.contains('/') {
                return Err(McpError::InvalidParams(
                    "Treatment URI must be treatment://{wound_type}".to_string(),
                ));
            }
            treatment::read_plan(uri, wound_type, service.knowledge_base())
        } else {
            Err(McpError::ResourceNotFound(uri.to_string()))
        }
    }
}
