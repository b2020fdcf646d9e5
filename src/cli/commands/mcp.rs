//! MCP command implementation.

use crate::config::Settings;
use crate::mcp::McpServer;
use crate::tools::ToolContext;
use anyhow::Result;

/// Run the MCP server.
pub async fn run_mcp(settings: &Settings) -> Result<()> {
    let server = McpServer::new(ToolContext::from_settings(settings)?);
    server.run().await
}
