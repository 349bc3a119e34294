//! Stdio transport — reads JSON-RPC from stdin, writes to stdout.

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::protocol::ProtocolHandler;
use crate::types::{McpError, McpResult};

use super::framing;

/// Stdio transport for desktop MCP clients.
pub struct StdioTransport {
    handler: ProtocolHandler,
}

impl StdioTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self { handler }
    }

    /// Run the transport loop until stdin closes.
    pub async fn run(&self) -> McpResult<()> {
        let mut reader = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        let mut line = String::new();

        tracing::info!("Stdio transport started");

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await.map_err(McpError::Io)?;

            if bytes_read == 0 {
                tracing::info!("EOF on stdin, shutting down");
                break;
            }

            if let Some(response) = self.handle_line(&line).await {
                write_framed(&mut stdout, &response).await?;
            }
        }

        Ok(())
    }

    /// Handle one input line. Blank lines and notifications produce no reply.
    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        match framing::parse_message(trimmed) {
            Ok(msg) => self.handler.handle_message(msg).await,
            Err(e) => {
                tracing::warn!("Parse error: {e}");
                Some(framing::unparsed_error(&e))
            }
        }
    }
}

async fn write_framed<W: AsyncWrite + Unpin>(out: &mut W, value: &Value) -> McpResult<()> {
    let framed = framing::frame_message(value)?;
    out.write_all(framed.as_bytes()).await.map_err(McpError::Io)?;
    out.flush().await.map_err(McpError::Io)
}
