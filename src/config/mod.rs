//! Configuration module for Ferret.
//!
//! Handles loading and saving application settings. Every bound used by the
//! tools (timeouts, retry budgets, chunk sizes) lives here so callers and
//! tests can override it without process-wide state.

mod settings;

pub use settings::{
    AttachmentSettings, ExecutorSettings, GeneralSettings, SearchSettings, Settings,
    TranscriptSettings, TranscriptionSettings,
};
