//! CLI command implementations

use crate::config::CliConfig;
use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

pub mod format;
pub mod generate_config;
pub mod prepare;
pub mod prompt;
pub mod split;
pub mod validate;

/// MARC21 corpus chunking and fine-tuning dataset preparation
#[derive(Debug, Parser)]
#[command(name = "marctune", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true, value_name = "FILE", env = "MARCTUNE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Suppress progress output and logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Split MARCXML files into numbered, size-bounded chunk files
    Split(split::SplitArgs),

    /// Build a JSONL training dataset from MARCXML records
    Prepare(prepare::PrepareArgs),

    /// Render the inference prompt for a book
    Prompt(prompt::PromptArgs),

    /// Reformat generated MARC text for display
    Format(format::FormatArgs),

    /// Write a default configuration or template file
    GenerateConfig(generate_config::GenerateConfigArgs),

    /// Check a configuration or template file
    Validate(validate::ValidateArgs),
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        if !self.quiet {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
                .init();
        }
    }

    fn load_config(&self) -> Result<CliConfig> {
        CliConfig::load(self.config.as_deref())
    }

    /// Execute the selected command
    pub fn execute(&self) -> Result<()> {
        log::debug!("Arguments: {self:?}");

        match &self.command {
            Commands::Split(args) => args.execute(&self.load_config()?, self.quiet),
            Commands::Prepare(args) => args.execute(&self.load_config()?, self.quiet),
            Commands::Prompt(args) => args.execute(),
            Commands::Format(args) => args.execute(),
            Commands::GenerateConfig(args) => args.execute(),
            Commands::Validate(args) => args.execute(self.config.as_deref()),
        }
    }
}
