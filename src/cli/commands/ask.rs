//! Ask command - show the prompt a question turns into.

use crate::attachment::AttachmentPresenter;
use crate::config::Settings;
use anyhow::Result;
use std::path::Path;

/// Print the question augmented with its attachment, if any.
pub fn run_ask(question: &str, file: Option<&Path>, settings: &Settings) -> Result<()> {
    if let Some(path) = file.filter(|p| !p.exists()) {
        crate::cli::Output::warning(&format!(
            "Attachment {} does not exist, asking without it.",
            path.display()
        ));
    }

    let presenter = AttachmentPresenter::new(settings.attachment.clone());
    println!("{}", presenter.augment(question, file));
    Ok(())
}
