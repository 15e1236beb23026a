//! Human-readable preview output

use super::ExampleSink;
use marctune_engine::TrainingExample;
use std::io::{self, Write};

/// Writes numbered examples separated by a rule
pub struct TextSink<W: Write> {
    writer: W,
    count: usize,
}

impl<W: Write> TextSink<W> {
    /// Create a new preview sink
    pub fn new(writer: W) -> Self {
        Self { writer, count: 0 }
    }
}

impl<W: Write> ExampleSink for TextSink<W> {
    fn write_example(&mut self, example: &TrainingExample) -> io::Result<()> {
        self.count += 1;
        writeln!(self.writer, "--- example {} ---", self.count)?;
        writeln!(self.writer, "{}", example.text)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
