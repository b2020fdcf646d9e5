//! MCP (Model Context Protocol) server for Ferret.
//!
//! Exposes the tool registry to MCP clients over stdio using JSON-RPC 2.0.

mod protocol;
mod server;

pub use server::McpServer;
