//! Wound care MCP server — segmentation, area measurement, infection screening,
//! and treatment plans for LLM clients.

pub mod config;
pub mod prompts;
pub mod protocol;
pub mod repl;
pub mod resources;
pub mod service;
pub mod tools;
pub mod transport;
pub mod types;

pub use config::{ConfigOverrides, ServerConfig};
pub use protocol::ProtocolHandler;
pub use service::WoundService;
pub use transport::StdioTransport;
