//! Record chunking driver
//!
//! A [`Splitter`] owns the accumulator and the running chunk index for a
//! whole run. Records are appended one at a time; whenever the threshold is
//! reached the buffer is written out, the index advances and the buffer is
//! reset. Inputs processed by the same splitter share one numbered
//! sequence, and [`Splitter::finish`] drains whatever is left after the last
//! input.

use crate::config::SplitConfig;
use crate::error::{EngineError, Result};
use crate::writer::ChunkWriter;
use crate::xml::RecordReader;
use marctune_core::ChunkAccumulator;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// One chunk file written during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkInfo {
    /// Chunk index used in the file name
    pub index: u32,
    /// Path of the written file
    pub path: PathBuf,
    /// Records in the chunk
    pub records: usize,
    /// Encoded size of the records, wrapper excluded
    pub bytes: u64,
}

/// Counts for one input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileSummary {
    /// Records read
    pub records: usize,
    /// Malformed fragments skipped
    pub skipped: usize,
}

/// Outcome of a split run
#[derive(Debug, Clone, Default)]
pub struct SplitReport {
    /// Chunks in write order
    pub chunks: Vec<ChunkInfo>,
    /// Inputs processed
    pub files: usize,
    /// Records written
    pub records: usize,
    /// Malformed fragments skipped across all inputs
    pub skipped: usize,
}

impl SplitReport {
    /// True when no fragment was skipped
    pub fn is_clean(&self) -> bool {
        self.skipped == 0
    }
}

/// Streams records from inputs into bounded chunk files
#[derive(Debug)]
pub struct Splitter {
    config: SplitConfig,
    writer: ChunkWriter,
    accumulator: ChunkAccumulator,
    /// `None` once `u32::MAX` has been used
    next_index: Option<u32>,
    report: SplitReport,
}

impl Splitter {
    /// Validate the configuration and prepare the output directory
    pub fn new(config: SplitConfig) -> Result<Self> {
        config.validate()?;
        let writer = ChunkWriter::new(&config)?;
        let accumulator = ChunkAccumulator::new(config.threshold)?;

        log::info!(
            "splitting into {} at {} per chunk",
            writer.output_dir().display(),
            config.threshold
        );

        Ok(Self {
            next_index: Some(config.start_index),
            config,
            writer,
            accumulator,
            report: SplitReport::default(),
        })
    }

    /// Index the next chunk will be written under, if any is left
    pub fn next_index(&self) -> Option<u32> {
        self.next_index
    }

    /// Progress so far
    pub fn report(&self) -> &SplitReport {
        &self.report
    }

    /// Split one input file
    pub fn split_path(&mut self, path: &Path) -> Result<FileSummary> {
        log::info!("reading {}", path.display());
        let reader = RecordReader::open(path, self.config.record_tag.clone(), self.config.recover)?;
        let summary = self.consume(reader)?;

        if summary.skipped > 0 {
            log::warn!(
                "{}: skipped {} malformed fragment(s)",
                path.display(),
                summary.skipped
            );
        }
        Ok(summary)
    }

    /// Split records from an already opened source
    pub fn split_reader<R: BufRead>(&mut self, input: R) -> Result<FileSummary> {
        let reader = RecordReader::new(input, self.config.record_tag.clone(), self.config.recover);
        self.consume(reader)
    }

    fn consume<R: BufRead>(&mut self, mut reader: RecordReader<R>) -> Result<FileSummary> {
        for node in reader.by_ref() {
            let mut serialized = node?.to_xml();
            serialized.push('\n');
            self.push(serialized)?;
        }

        let summary = FileSummary {
            records: reader.records(),
            skipped: reader.skipped(),
        };
        self.report.files += 1;
        self.report.skipped += summary.skipped;
        Ok(summary)
    }

    /// Append one serialized record, flushing when the threshold is reached
    pub fn push(&mut self, serialized: String) -> Result<()> {
        self.accumulator.append(serialized);
        self.report.records += 1;

        if self.accumulator.should_flush() {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let Some(index) = self.next_index else {
            return Err(EngineError::ConfigError(format!(
                "chunk index exhausted: no index left after {}",
                u32::MAX
            )));
        };
        let path = self.writer.flush(self.accumulator.records(), index)?;

        let info = ChunkInfo {
            index,
            path,
            records: self.accumulator.len(),
            bytes: self.accumulator.byte_len(),
        };
        log::info!(
            "chunk {} saved: {} ({} records, {} bytes)",
            info.index,
            info.path.display(),
            info.records,
            info.bytes
        );
        self.report.chunks.push(info);

        self.next_index = index.checked_add(1);
        self.accumulator.reset();
        Ok(())
    }

    /// Write the remaining records, if any, and return the run report
    pub fn finish(mut self) -> Result<SplitReport> {
        if !self.accumulator.is_empty() {
            self.flush()?;
        }
        Ok(self.report)
    }
}

/// Split a sequence of inputs into one numbered chunk sequence
pub fn split_files<P: AsRef<Path>>(config: SplitConfig, inputs: &[P]) -> Result<SplitReport> {
    let mut splitter = Splitter::new(config)?;
    for input in inputs {
        splitter.split_path(input.as_ref())?;
    }
    splitter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use marctune_core::Threshold;
    use tempfile::TempDir;

    fn splitter(dir: &Path, threshold: Threshold) -> Splitter {
        Splitter::new(SplitConfig {
            output_dir: dir.to_path_buf(),
            threshold,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_push_flushes_at_threshold() {
        let temp_dir = TempDir::new().unwrap();
        let mut splitter = splitter(temp_dir.path(), Threshold::Records(2));

        splitter.push("<record>1</record>\n".to_string()).unwrap();
        assert!(splitter.report().chunks.is_empty());
        splitter.push("<record>2</record>\n".to_string()).unwrap();
        assert_eq!(splitter.report().chunks.len(), 1);
        assert_eq!(splitter.next_index(), Some(2));
    }

    #[test]
    fn test_finish_drains_partial_chunk() {
        let temp_dir = TempDir::new().unwrap();
        let mut splitter = splitter(temp_dir.path(), Threshold::Records(10));
        splitter.push("<record/>\n".to_string()).unwrap();

        let report = splitter.finish().unwrap();
        assert_eq!(report.chunks.len(), 1);
        assert_eq!(report.chunks[0].records, 1);
        assert!(report.chunks[0].path.ends_with("marc_chunk_001.xml"));
    }

    #[test]
    fn test_finish_without_records_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let splitter = splitter(temp_dir.path(), Threshold::Records(10));
        let report = splitter.finish().unwrap();
        assert!(report.chunks.is_empty());
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_start_index_respected() {
        let temp_dir = TempDir::new().unwrap();
        let mut splitter = Splitter::new(SplitConfig {
            output_dir: temp_dir.path().to_path_buf(),
            threshold: Threshold::Records(1),
            start_index: 17,
            ..Default::default()
        })
        .unwrap();

        splitter
            .split_reader("<c><record/><record/></c>".as_bytes())
            .unwrap();
        let report = splitter.finish().unwrap();
        let indices: Vec<u32> = report.chunks.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![17, 18]);
        assert!(temp_dir.path().join("marc_chunk_018.xml").exists());
    }

    #[test]
    fn test_last_chunk_index_then_exhausted() {
        let temp_dir = TempDir::new().unwrap();
        let mut splitter = Splitter::new(SplitConfig {
            output_dir: temp_dir.path().to_path_buf(),
            threshold: Threshold::Records(1),
            start_index: u32::MAX,
            ..Default::default()
        })
        .unwrap();

        splitter.push("<record>1</record>\n".to_string()).unwrap();
        assert_eq!(splitter.report().chunks[0].index, u32::MAX);
        assert_eq!(splitter.next_index(), None);

        let result = splitter.push("<record>2</record>\n".to_string());
        assert!(matches!(result, Err(EngineError::ConfigError(_))));
        assert_eq!(splitter.report().chunks.len(), 1);
    }
}
