//! Chunk file output

use crate::config::{SplitConfig, WrapperConfig};
use crate::error::{EngineError, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Declaration written at the top of every chunk
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Writes buffered records to numbered, self-contained XML files
#[derive(Debug, Clone)]
pub struct ChunkWriter {
    output_dir: PathBuf,
    prefix: String,
    width: usize,
    header: String,
    footer: String,
}

impl ChunkWriter {
    /// Prepare the output directory, creating it if needed
    pub fn new(config: &SplitConfig) -> Result<Self> {
        fs::create_dir_all(&config.output_dir)
            .map_err(|e| EngineError::file(&config.output_dir, e))?;

        Ok(Self {
            output_dir: config.output_dir.clone(),
            prefix: config.prefix.clone(),
            width: config.index_width,
            header: header(&config.wrapper),
            footer: format!("</{}>\n", config.wrapper.root),
        })
    }

    /// Directory receiving the chunks
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the chunk with the given index
    pub fn chunk_path(&self, index: u32) -> PathBuf {
        self.output_dir.join(format!(
            "{}{:0width$}.xml",
            self.prefix,
            index,
            width = self.width
        ))
    }

    /// Write one chunk file holding `records` in order
    ///
    /// Any existing file with the same name is replaced.
    pub fn flush(&self, records: &[String], index: u32) -> Result<PathBuf> {
        let path = self.chunk_path(index);
        let file = File::create(&path).map_err(|e| EngineError::file(&path, e))?;
        self.write_chunk(BufWriter::new(file), records)
            .map_err(|e| EngineError::file(&path, e))?;

        Ok(path)
    }

    fn write_chunk<W: Write>(&self, mut out: W, records: &[String]) -> std::io::Result<()> {
        out.write_all(self.header.as_bytes())?;
        for record in records {
            out.write_all(record.as_bytes())?;
        }
        out.write_all(self.footer.as_bytes())?;
        out.flush()
    }
}

fn header(wrapper: &WrapperConfig) -> String {
    match &wrapper.namespace {
        Some(ns) => format!("{XML_DECLARATION}\n<{} xmlns=\"{ns}\">\n", wrapper.root),
        None => format!("{XML_DECLARATION}\n<{}>\n", wrapper.root),
    }
}
