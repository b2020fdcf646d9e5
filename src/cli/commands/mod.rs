//! CLI command implementations.

mod ask;
mod config;
mod doctor;
mod exec;
mod mcp;
mod search;
mod sniff;
mod transcribe;
mod transcript;

pub use ask::run_ask;
pub use config::run_config;
pub use doctor::run_doctor;
pub use exec::run_exec;
pub use mcp::run_mcp;
pub use search::{run_reduce, run_search};
pub use sniff::run_sniff;
pub use transcribe::run_transcribe;
pub use transcript::run_transcript;
