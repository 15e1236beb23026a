//! marctune CLI library
//!
//! This library provides the command-line interface for splitting MARCXML
//! corpora into bounded chunks and preparing fine-tuning datasets.

pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod progress;

pub use commands::{Cli, Commands};
pub use error::{CliError, CliResult};
