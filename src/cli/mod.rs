//! CLI module for Ferret.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ferret - tool execution layer for a question-answering agent
///
/// Presents attachments, runs source files in a sandbox, fetches video
/// transcripts and trims web search results down to what matters.
#[derive(Parser, Debug)]
#[command(name = "ferret")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "FERRET_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the prompt a question becomes once a file is attached
    Ask {
        /// The question
        question: String,

        /// File attached to the question
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Classify a file as text or binary
    Sniff {
        /// File to inspect
        path: PathBuf,
    },

    /// Run a source file in the sandbox
    Exec {
        /// Source file to run
        path: PathBuf,

        /// Time limit in seconds (overrides config)
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Fetch a video transcript starting at a phrase
    Transcript {
        /// YouTube URL or video ID
        url: String,

        /// Phrase to skip ahead to
        phrase: String,
    },

    /// Search the web and keep only chunks mentioning the keywords
    Search {
        /// Search query
        query: String,

        /// Important word a chunk must contain (repeatable)
        #[arg(short, long = "keyword", required = true)]
        keywords: Vec<String>,

        /// Chunk size in characters
        #[arg(long)]
        chunk_size: Option<usize>,
    },

    /// Reduce a saved search result (JSON records or plain text)
    Reduce {
        /// Input file (stdin if not specified)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Important word a chunk must contain (repeatable)
        #[arg(short, long = "keyword", required = true)]
        keywords: Vec<String>,

        /// Chunk size in characters
        #[arg(long)]
        chunk_size: Option<usize>,
    },

    /// Transcribe an audio file
    Transcribe {
        /// Audio file path
        audio: PathBuf,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Start MCP server for AI assistant integration
    Mcp,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
