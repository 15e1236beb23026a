//! Format command implementation

use crate::input::FileReader;
use anyhow::Result;
use clap::Args;
use marctune_core::format_for_display;
use std::path::PathBuf;

/// Arguments for the format command
#[derive(Debug, Args)]
pub struct FormatArgs {
    /// Generated MARC text (default: stdin)
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,
}

impl FormatArgs {
    /// Execute the format command
    pub fn execute(&self) -> Result<()> {
        let raw = FileReader::read_text_or_stdin(self.input.as_deref())?;
        let formatted = format_for_display(&raw);
        if !formatted.is_empty() {
            println!("{formatted}");
        }
        Ok(())
    }
}
