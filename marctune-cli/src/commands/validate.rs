//! Validate command implementation

use crate::config::CliConfig;
use crate::input::FileReader;
use anyhow::Result;
use clap::Args;
use marctune_core::PromptTemplate;
use std::path::{Path, PathBuf};

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Prompt template file to validate
    #[arg(long, value_name = "FILE")]
    pub template: Option<PathBuf>,
}

impl ValidateArgs {
    /// Execute the validate command against `--config` and/or `--template`
    pub fn execute(&self, config: Option<&Path>) -> Result<()> {
        if config.is_none() && self.template.is_none() {
            anyhow::bail!("Nothing to validate: pass --config FILE or --template FILE");
        }

        if let Some(path) = config {
            println!("Validating configuration: {}", path.display());
            match CliConfig::from_file(path).and_then(|c| c.validate().map(|_| c)) {
                Ok(config) => {
                    println!("✓ Configuration is valid!");
                    println!("  Output directory: {}", config.split.output_dir.display());
                    println!("  Threshold: {}", config.split.threshold);
                }
                Err(e) => {
                    println!("✗ Configuration is invalid!");
                    println!("  Error: {e:#}");
                    return Err(anyhow::anyhow!("Validation failed: {e:#}"));
                }
            }
        }

        if let Some(path) = &self.template {
            println!("Validating template: {}", path.display());
            match FileReader::read_text(path)
                .and_then(|text| Ok(PromptTemplate::from_toml_str(&text)?))
            {
                Ok(template) => {
                    println!("✓ Template is valid!");
                    println!("  Name: {}", template.metadata.name);
                    println!("  Placeholders: {}", template.placeholders().join(", "));
                }
                Err(e) => {
                    println!("✗ Template is invalid!");
                    println!("  Error: {e:#}");
                    return Err(anyhow::anyhow!("Validation failed: {e:#}"));
                }
            }
        }

        Ok(())
    }
}
