//! Sniff command.

use crate::attachment::classify;
use anyhow::Result;
use std::path::Path;

/// Print `text` or `binary` for the file at `path`.
pub fn run_sniff(path: &Path) -> Result<()> {
    println!("{}", classify(path));
    Ok(())
}
