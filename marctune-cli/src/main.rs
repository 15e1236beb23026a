//! marctune command-line entry point

use anyhow::Result;
use clap::Parser;
use marctune_cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.init_logging();
    cli.execute()
}
