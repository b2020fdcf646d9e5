//! Tool registry exposed to the reasoning loop.
//!
//! The agent picks a tool by name and passes JSON arguments; [`parse_tool_call`]
//! turns that into a [`ToolCall`] and [`ToolContext::execute`] runs it.

use crate::attachment::{classify, Classification};
use crate::config::Settings;
use crate::error::{FerretError, Result};
use crate::executor::SandboxedExecutor;
use crate::search::{default_provider, optimized_web_search, SearchProvider};
use crate::spreadsheet::process_excel_file;
use crate::transcript::TranscriptFetcher;
use crate::transcription::{transcribe_audio, Transcriber, WhisperTranscriber};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Available tools for the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Run a source file in the sandbox.
    ExecuteSourceFile { file_path: String },

    /// Fetch a video transcript starting at a phrase.
    LoadYoutube { video_url: String, phrase: String },

    /// Web search reduced to keyword-bearing chunks.
    OptimizedWebSearch {
        search_query: String,
        important_words: Vec<String>,
        #[serde(default = "default_batch_size")]
        batch_size: usize,
    },

    /// Transcribe an audio file.
    TranscribeAudio { mp3_path: String },

    /// Report whether a file looks like UTF-8 text.
    IsTextFile { file_path: String },

    /// Render the first sheet of an Excel workbook as a table.
    ProcessExcelFile { file_path: String },

    /// Reverse a string character by character.
    ReverseString { text: String },
}

fn default_batch_size() -> usize {
    500
}

impl ToolCall {
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::ExecuteSourceFile { .. } => "execute_source_file",
            ToolCall::LoadYoutube { .. } => "load_youtube",
            ToolCall::OptimizedWebSearch { .. } => "optimized_web_search",
            ToolCall::TranscribeAudio { .. } => "transcribe_audio",
            ToolCall::IsTextFile { .. } => "is_text_file",
            ToolCall::ProcessExcelFile { .. } => "process_excel_file",
            ToolCall::ReverseString { .. } => "reverse_string",
        }
    }
}

/// Tool execution context holding every capability backend.
pub struct ToolContext {
    pub executor: SandboxedExecutor,
    pub transcripts: TranscriptFetcher,
    pub search: Arc<dyn SearchProvider>,
    pub search_throttle: Duration,
    pub transcriber: Arc<dyn Transcriber>,
    pub audio_extensions: Vec<String>,
}

impl ToolContext {
    /// Wire up the production backends from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            executor: SandboxedExecutor::new(settings.executor.clone()),
            transcripts: TranscriptFetcher::youtube(&settings.transcript, settings.temp_dir()),
            search: Arc::new(default_provider(&settings.search)?),
            search_throttle: Duration::from_secs(settings.search.throttle_seconds),
            transcriber: Arc::new(WhisperTranscriber::new(&settings.transcription)?),
            audio_extensions: settings.attachment.audio_extensions.clone(),
        })
    }

    /// Execute a tool call and return the result as a string.
    #[instrument(skip(self, tool), fields(tool = tool.name()))]
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        debug!("executing tool");
        match tool {
            ToolCall::ExecuteSourceFile { file_path } => {
                Ok(self.executor.execute(Path::new(file_path)).await)
            }
            ToolCall::LoadYoutube { video_url, phrase } => {
                self.transcripts.fetch(video_url, phrase).await
            }
            ToolCall::OptimizedWebSearch {
                search_query,
                important_words,
                batch_size,
            } => Ok(optimized_web_search(
                self.search.as_ref(),
                search_query,
                important_words,
                *batch_size,
                self.search_throttle,
            )
            .await),
            ToolCall::TranscribeAudio { mp3_path } => {
                transcribe_audio(
                    self.transcriber.as_ref(),
                    Path::new(mp3_path),
                    &self.audio_extensions,
                )
                .await
            }
            ToolCall::IsTextFile { file_path } => {
                let is_text = classify(Path::new(file_path)) == Classification::Text;
                Ok(is_text.to_string())
            }
            ToolCall::ProcessExcelFile { file_path } => process_excel_file(Path::new(file_path)),
            ToolCall::ReverseString { text } => Ok(reverse_string(text)),
        }
    }
}

/// Reverse the characters of `text`.
pub fn reverse_string(text: &str) -> String {
    text.chars().rev().collect()
}

/// Name, description and JSON Schema of one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Definitions of every tool, in the order they are offered to the agent.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "execute_source_file".to_string(),
            description: "Execute a source file in an isolated subprocess and return its output. \
                A bare integer printed by the script is returned on its own."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "Path to the source file to run"
                    }
                },
                "required": ["file_path"]
            }),
        },
        ToolDefinition {
            name: "load_youtube".to_string(),
            description: "Load the transcript of a YouTube video, starting from the first \
                place a phrase is spoken. Returns the whole transcript if the phrase never occurs."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "video_url": {
                        "type": "string",
                        "description": "YouTube URL or video ID"
                    },
                    "phrase": {
                        "type": "string",
                        "description": "Phrase to skip ahead to"
                    }
                },
                "required": ["video_url", "phrase"]
            }),
        },
        ToolDefinition {
            name: "optimized_web_search".to_string(),
            description: "Search the web and keep only the parts of the results that \
                contain at least one important word."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "search_query": {
                        "type": "string",
                        "description": "The search query (e.g. 'Beatles albums Wikipedia')"
                    },
                    "important_words": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Keywords a chunk must contain to be kept"
                    },
                    "batch_size": {
                        "type": "integer",
                        "description": "Chunk size in characters",
                        "default": 500
                    }
                },
                "required": ["search_query", "important_words"]
            }),
        },
        ToolDefinition {
            name: "transcribe_audio".to_string(),
            description: "Transcribe speech from an audio file to text.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "mp3_path": {
                        "type": "string",
                        "description": "Path to the audio file"
                    }
                },
                "required": ["mp3_path"]
            }),
        },
        ToolDefinition {
            name: "is_text_file".to_string(),
            description: "Check whether a file is UTF-8 text by inspecting its first kilobyte."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "Path to the file to check"
                    }
                },
                "required": ["file_path"]
            }),
        },
        ToolDefinition {
            name: "process_excel_file".to_string(),
            description: "Read an Excel file (.xlsx or .xls) and return its first sheet as a \
                markdown table, with the first row as the header."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "Path to the Excel file"
                    }
                },
                "required": ["file_path"]
            }),
        },
        ToolDefinition {
            name: "reverse_string".to_string(),
            description: "Reverse the order of characters in a string.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "text": {
                        "type": "string",
                        "description": "Text to reverse"
                    }
                },
                "required": ["text"]
            }),
        },
    ]
}

/// Parse a tool call from a tool name and its JSON arguments.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: serde_json::Value = if arguments.trim().is_empty() {
        json!({})
    } else {
        serde_json::from_str(arguments)
            .map_err(|e| FerretError::InvalidInput(format!("Invalid tool arguments: {}", e)))?
    };

    parse_tool_value(name, args)
}

/// Like [`parse_tool_call`], with arguments already decoded.
pub fn parse_tool_value(name: &str, args: serde_json::Value) -> Result<ToolCall> {
    if !tool_definitions().iter().any(|def| def.name == name) {
        return Err(FerretError::Tool(format!("Unknown tool: {}", name)));
    }

    let serde_json::Value::Object(mut fields) = args else {
        return Err(FerretError::InvalidInput(
            "Tool arguments must be a JSON object".to_string(),
        ));
    };
    fields.insert("name".to_string(), json!(name));

    serde_json::from_value(serde_json::Value::Object(fields))
        .map_err(|e| FerretError::InvalidInput(format!("Invalid arguments for {}: {}", name, e)))
}
