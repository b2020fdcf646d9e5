//! Ferret - tool execution layer for a question-answering agent.
//!
//! The reasoning loop lives elsewhere; this crate supplies the capabilities
//! it calls:
//! - Attachment sniffing and presentation
//! - Sandboxed, time-bounded execution of source files
//! - Video transcript fetching with bounded retry and phrase seeking
//! - Web search reduced to keyword-bearing chunks
//! - Audio transcription via OpenAI Whisper
//! - Spreadsheet attachments rendered as markdown tables
//!
//! Capabilities are exposed as a tool registry, over MCP, and through the CLI.

pub mod attachment;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod mcp;
pub mod search;
pub mod spreadsheet;
pub mod tools;
pub mod transcript;
pub mod transcription;

pub use error::{FerretError, Result};
