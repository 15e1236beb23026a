//! Output formatting module

use marctune_engine::TrainingExample;
use std::io;

/// Trait for training example writers
///
/// Errors are I/O errors so the dataset builder can propagate them.
pub trait ExampleSink {
    /// Write a single example
    fn write_example(&mut self, example: &TrainingExample) -> io::Result<()>;

    /// Finalize output
    fn finish(&mut self) -> io::Result<()>;
}

pub mod jsonl;
pub mod text;

pub use jsonl::JsonlSink;
pub use text::TextSink;
