//! Training dataset preparation
//!
//! Records are decoded into the MARC model, their catalog metadata is
//! rendered into the training prompt and the record's mnemonic text becomes
//! the assistant answer. Plain-text reference documents contribute one
//! example per passage.

use crate::config::PrepareConfig;
use crate::error::{EngineError, Result};
use crate::marcxml;
use crate::xml::RecordReader;
use marctune_core::prompt::{self, PromptTemplate, TemplateVars};
use marctune_core::{chunk_text, BookMetadata, Record};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One chat-formatted training example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    /// Full conversation text
    pub text: String,
}

/// Counts for a preparation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrepareReport {
    /// Record examples emitted
    pub records: usize,
    /// Reference passage examples emitted
    pub passages: usize,
    /// Fragments or records skipped
    pub skipped: usize,
    /// Inputs processed
    pub files: usize,
}

impl PrepareReport {
    /// Total examples emitted
    pub fn examples(&self) -> usize {
        self.records + self.passages
    }
}

/// Builds training examples from record files and reference documents
#[derive(Debug)]
pub struct DatasetBuilder {
    config: PrepareConfig,
    record_template: PromptTemplate,
    reference_template: PromptTemplate,
    report: PrepareReport,
}

impl DatasetBuilder {
    /// Builder using the built-in templates
    pub fn new(config: PrepareConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            record_template: prompt::builtin(prompt::TRAINING_TEMPLATE)?.clone(),
            reference_template: prompt::builtin(prompt::REFERENCE_TEMPLATE)?.clone(),
            report: PrepareReport::default(),
        })
    }

    /// Replace the template used for record examples
    pub fn with_record_template(mut self, template: PromptTemplate) -> Result<Self> {
        template.validate()?;
        self.record_template = template;
        Ok(self)
    }

    /// Progress so far
    pub fn report(&self) -> &PrepareReport {
        &self.report
    }

    /// True once the record limit has been reached
    pub fn is_full(&self) -> bool {
        self.config
            .max_records
            .is_some_and(|max| self.report.records >= max)
    }

    /// Render the example for one decoded record
    pub fn record_example(&self, record: &Record) -> TrainingExample {
        let metadata = BookMetadata::from_record(record);
        let vars = TemplateVars::from_metadata(&metadata);
        TrainingExample {
            text: self
                .record_template
                .render_example(&vars, &record.to_string()),
        }
    }

    /// Emit one example per record of a MARCXML file
    pub fn add_record_file<F>(&mut self, path: &Path, sink: &mut F) -> Result<()>
    where
        F: FnMut(TrainingExample) -> Result<()>,
    {
        self.report.files += 1;
        if self.is_full() {
            log::debug!("record limit reached, skipping {}", path.display());
            return Ok(());
        }

        log::info!("reading records from {}", path.display());
        let mut reader =
            RecordReader::open(path, self.config.record_tag.clone(), self.config.recover)?;

        for node in reader.by_ref() {
            let node = node?;
            let record = match marcxml::to_record(&node) {
                Ok(record) => record,
                Err(EngineError::InvalidRecord(reason)) if self.config.recover => {
                    log::warn!("{}: skipping record: {reason}", path.display());
                    self.report.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            sink(self.record_example(&record))?;
            self.report.records += 1;

            if self.report.records % self.config.progress_interval == 0 {
                log::info!("{} records processed", self.report.records);
            }
            if self.is_full() {
                log::info!("record limit of {} reached", self.report.records);
                break;
            }
        }

        self.report.skipped += reader.skipped();
        Ok(())
    }

    /// Emit one example per passage of a plain-text reference document
    ///
    /// The passage is both the prompt document and the answer.
    pub fn add_reference_text<F>(&mut self, text: &str, sink: &mut F) -> Result<()>
    where
        F: FnMut(TrainingExample) -> Result<()>,
    {
        for passage in chunk_text(text.trim(), self.config.passage_chars)? {
            let vars = TemplateVars::document(passage);
            sink(TrainingExample {
                text: self.reference_template.render_example(&vars, passage),
            })?;
            self.report.passages += 1;
        }
        Ok(())
    }

    /// Read a reference document from disk
    pub fn add_reference_file<F>(&mut self, path: &Path, sink: &mut F) -> Result<()>
    where
        F: FnMut(TrainingExample) -> Result<()>,
    {
        log::info!("reading reference document {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::file(path, e))?;
        self.report.files += 1;
        self.add_reference_text(&text, sink)
    }

    /// Finish the run
    pub fn finish(self) -> PrepareReport {
        self.report
    }
}
