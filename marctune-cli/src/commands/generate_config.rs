//! Generate config command implementation

use crate::config::CliConfig;
use anyhow::{Context, Result};
use clap::Args;
use marctune_core::prompt::{self, TRAINING_TEMPLATE};
use std::fs;
use std::path::PathBuf;

const CONFIG_HEADER: &str = "\
# marctune configuration
#
# Command-line flags override these values. The output directory may also
# be set with MARCTUNE_OUTPUT_DIR.
#
# threshold is either { bytes = N } or { records = N }.
# record_tag accepts Clark notation: \"{http://www.loc.gov/MARC21/slim}record\".
# prepare.max_records = 0 disables the limit.

";

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Emit the training prompt template instead of the CLI configuration
    #[arg(long)]
    pub template: bool,
}

impl GenerateConfigArgs {
    /// Generate the file content
    pub fn generate(&self) -> Result<String> {
        if self.template {
            let template = prompt::builtin(TRAINING_TEMPLATE)?;
            return toml::to_string_pretty(template).context("Failed to serialize template");
        }
        Ok(format!("{CONFIG_HEADER}{}", CliConfig::default().to_toml_string()?))
    }

    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        let content = self.generate()?;

        let Some(output) = &self.output else {
            print!("{content}");
            return Ok(());
        };

        fs::write(output, content)
            .with_context(|| format!("Failed to write to {}", output.display()))?;

        println!("✓ Configuration template generated: {}", output.display());
        println!();
        println!("Next steps:");
        println!("1. Edit the file to change the defaults");
        println!("2. Validate it:");
        if self.template {
            println!("   marctune validate --template {}", output.display());
            println!("3. Use it for dataset preparation:");
            println!("   marctune prepare records.xml --template {}", output.display());
        } else {
            println!("   marctune --config {} validate", output.display());
            println!("3. Use it for splitting:");
            println!("   marctune --config {} split records.xml", output.display());
        }

        Ok(())
    }
}
