//! MCP resource implementations.

pub mod registry;
pub mod templates;
pub mod treatment;

pub use registry::ResourceRegistry;
