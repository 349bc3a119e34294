//! MCP prompt templates.

pub mod assess_wound;
pub mod registry;
pub mod treatment_guide;

pub use registry::PromptRegistry;
