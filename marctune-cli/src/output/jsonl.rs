//! JSON Lines output

use super::ExampleSink;
use marctune_engine::TrainingExample;
use std::io::{self, Write};

/// Writes one `{"text": ...}` object per line
pub struct JsonlSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonlSink<W> {
    /// Create a new JSONL sink
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ExampleSink for JsonlSink<W> {
    fn write_example(&mut self, example: &TrainingExample) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, example)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
