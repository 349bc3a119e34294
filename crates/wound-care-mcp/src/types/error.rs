//! Error types and JSON-RPC error codes for the MCP server.

use super::message::{JsonRpcError, JsonRpcErrorObject, RequestId, JSONRPC_VERSION};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// MCP-specific error codes.
pub mod mcp_error_codes {
    pub const RESOURCE_NOT_FOUND: i32 = -32802;
    pub const TOOL_NOT_FOUND: i32 = -32803;
    pub const PROMPT_NOT_FOUND: i32 = -32804;
    pub const WOUND_ERROR: i32 = -32850;
    pub const CONFIGURATION_ERROR: i32 = -32851;
}

/// All errors that can occur in the MCP server.
#[derive(thiserror::Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Prompt not found: {0}")]
    PromptNotFound(String),

    #[error("Wound analysis error: {0}")]
    WoundError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    pub fn code(&self) -> i32 {
        use error_codes::*;
        use mcp_error_codes::*;
        match self {
            McpError::ParseError(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => INVALID_PARAMS,
            McpError::InternalError(_) => INTERNAL_ERROR,
            McpError::ResourceNotFound(_) => RESOURCE_NOT_FOUND,
            McpError::ToolNotFound(_) => TOOL_NOT_FOUND,
            McpError::PromptNotFound(_) => PROMPT_NOT_FOUND,
            McpError::WoundError(_) => WOUND_ERROR,
            McpError::Configuration(_) => CONFIGURATION_ERROR,
            McpError::Transport(_) | McpError::Io(_) => INTERNAL_ERROR,
            McpError::Json(_) => PARSE_ERROR,
        }
    }

    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        JsonRpcError {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcErrorObject {
                code: self.code(),
                message: self.to_string(),
                data: None,
            },
        }
    }
}

impl From<wound_care::WoundError> for McpError {
    fn from(e: wound_care::WoundError) -> Self {
        match e {
            wound_care::WoundError::Configuration(msg) => McpError::Configuration(msg),
            wound_care::WoundError::ModelNotAvailable(msg) => McpError::Configuration(msg),
            other => McpError::WoundError(other.to_string()),
        }
    }
}

pub type McpResult<T> = Result<T, McpError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_wound_error_mapping() {
        let config: McpError =
            wound_care::WoundError::ModelNotAvailable("missing".to_string()).into();
        assert_eq!(config.code(), mcp_error_codes::CONFIGURATION_ERROR);

        let kb: McpError =
            wound_care::WoundError::KnowledgeBaseNotFound(PathBuf::from("kb.json")).into();
        assert_eq!(kb.code(), mcp_error_codes::WOUND_ERROR);
        assert!(kb.to_string().contains("kb.json"));
    }

    #[test]
    fn test_json_rpc_error_shape() {
        let err = McpError::ToolNotFound("segment".to_string())
            .to_json_rpc_error(RequestId::Number(3));
        assert_eq!(err.error.code, mcp_error_codes::TOOL_NOT_FOUND);
        assert_eq!(err.id, RequestId::Number(3));
        assert_eq!(err.error.message, "Tool not found: segment");
    }
}
