//! MCP tool implementations.

pub mod describe_wound;
pub mod diagnose_wound;
pub mod get_treatment_plan;
pub mod registry;
pub mod segment_wound;
pub mod sum;

pub use registry::ToolRegistry;
