//! Prompt command implementation

use crate::input::FileReader;
use anyhow::{Context, Result};
use clap::Args;
use marctune_core::prompt::{self, INFERENCE_TEMPLATE};
use marctune_core::{BookMetadata, PromptTemplate, TemplateVars};
use std::path::PathBuf;

/// Arguments for the prompt command
#[derive(Debug, Args)]
pub struct PromptArgs {
    /// Full title (title : remainder / responsibility)
    #[arg(short, long, required = true)]
    pub title: String,

    /// Main entry author
    #[arg(short, long, default_value = "")]
    pub author: String,

    /// Publication year
    #[arg(short, long, default_value = "")]
    pub year: String,

    /// Edition statement
    #[arg(short, long, default_value = "")]
    pub edition: String,

    /// Imprint (place : publisher, year)
    #[arg(short, long, default_value = "")]
    pub imprint: String,

    /// Subjects separated by `; `
    #[arg(short, long, default_value = "")]
    pub subjects: String,

    /// Built-in template name
    #[arg(long, value_name = "NAME", default_value = INFERENCE_TEMPLATE, conflicts_with = "template_file")]
    pub template: String,

    /// Template file (TOML)
    #[arg(long, value_name = "FILE")]
    pub template_file: Option<PathBuf>,
}

impl PromptArgs {
    fn metadata(&self) -> BookMetadata {
        BookMetadata {
            full_title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            year: self.year.trim().to_string(),
            edition: self.edition.trim().to_string(),
            imprint: self.imprint.trim().to_string(),
            subjects: self.subjects.trim().to_string(),
        }
    }

    /// Render the generation request
    pub fn render(&self) -> Result<String> {
        let metadata = self.metadata();
        let vars = TemplateVars::from_metadata(&metadata);

        let request = match &self.template_file {
            Some(path) => PromptTemplate::from_toml_str(&FileReader::read_text(path)?)
                .with_context(|| format!("Invalid template: {}", path.display()))?
                .render_request(&vars),
            None => prompt::builtin(&self.template)?.render_request(&vars),
        };
        Ok(request)
    }

    /// Execute the prompt command
    pub fn execute(&self) -> Result<()> {
        print!("{}", self.render()?);
        Ok(())
    }
}
