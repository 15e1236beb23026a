//! Prepare command implementation

use crate::config::CliConfig;
use crate::input::{resolve_inputs, FileReader};
use crate::output::{ExampleSink, JsonlSink, TextSink};
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use clap::Args;
use marctune_core::PromptTemplate;
use marctune_engine::{
    DatasetBuilder, EngineError, PrepareConfig, RecordTag, TrainingExample,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Arguments for the prepare command
#[derive(Debug, Args)]
pub struct PrepareArgs {
    /// MARCXML files, directories or glob patterns
    #[arg(value_name = "PATH/PATTERN", required = true)]
    pub input: Vec<String>,

    /// Plain-text reference documents (files, directories or patterns)
    #[arg(short, long, value_name = "PATH/PATTERN")]
    pub docs: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "jsonl")]
    pub format: OutputFormat,

    /// Maximum record examples (0 = no limit)
    #[arg(short = 'n', long, value_name = "N")]
    pub max_records: Option<usize>,

    /// Maximum reference passage length in characters
    #[arg(long, value_name = "CHARS")]
    pub passage_chars: Option<usize>,

    /// Custom training template (TOML)
    #[arg(long, value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Record element, `record` or `{namespace}record`
    #[arg(short, long, value_name = "TAG")]
    pub tag: Option<String>,

    /// Fail on malformed fragments or undecodable records
    #[arg(long)]
    pub strict: bool,
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per line
    Jsonl,
    /// Numbered human-readable preview
    Text,
}

impl PrepareArgs {
    /// Merge flags over the config file settings
    pub fn to_config(&self, config: &CliConfig) -> Result<PrepareConfig> {
        let mut prepare = config.prepare.to_engine()?;

        if let Some(max) = self.max_records {
            prepare.max_records = (max > 0).then_some(max);
        }
        if let Some(chars) = self.passage_chars {
            prepare.passage_chars = chars;
        }
        if let Some(tag) = &self.tag {
            prepare.record_tag = tag.parse::<RecordTag>()?;
        }
        if self.strict {
            prepare.recover = false;
        }

        prepare.validate()?;
        Ok(prepare)
    }

    fn template_path<'a>(&'a self, config: &'a CliConfig) -> Option<&'a PathBuf> {
        self.template.as_ref().or(config.prepare.template.as_ref())
    }

    fn open_sink(&self) -> Result<Box<dyn ExampleSink>> {
        let writer: Box<dyn Write> = match &self.output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                Box::new(BufWriter::new(file))
            }
            None => Box::new(BufWriter::new(io::stdout())),
        };

        Ok(match self.format {
            OutputFormat::Jsonl => Box::new(JsonlSink::new(writer)),
            OutputFormat::Text => Box::new(TextSink::new(writer)),
        })
    }

    /// Execute the prepare command
    pub fn execute(&self, config: &CliConfig, quiet: bool) -> Result<()> {
        let prepare = self.to_config(config)?;
        let records = resolve_inputs(&self.input, &["xml"])?;
        let docs = if self.docs.is_empty() {
            Vec::new()
        } else {
            resolve_inputs(&self.docs, &["txt"])?
        };

        let mut builder = DatasetBuilder::new(prepare)?;
        if let Some(path) = self.template_path(config) {
            let template = PromptTemplate::from_toml_str(&FileReader::read_text(path)?)
                .with_context(|| format!("Invalid template: {}", path.display()))?;
            builder = builder.with_record_template(template)?;
        }

        log::info!(
            "Preparing dataset from {} record file(s) and {} document(s)",
            records.len(),
            docs.len()
        );

        let mut sink = self.open_sink()?;
        let mut emit = |example: TrainingExample| {
            sink.write_example(&example).map_err(EngineError::from)
        };

        let mut progress = ProgressReporter::new(quiet);
        progress.init_files((records.len() + docs.len()) as u64);

        for file in &records {
            builder
                .add_record_file(file, &mut emit)
                .with_context(|| format!("Failed to read records from {}", file.display()))?;
            progress.file_completed(&file.display().to_string());
        }
        for file in &docs {
            builder
                .add_reference_file(file, &mut emit)
                .with_context(|| format!("Failed to read document {}", file.display()))?;
            progress.file_completed(&file.display().to_string());
        }
        progress.finish();
        sink.finish().context("Failed to write output")?;

        let report = builder.finish();
        if !quiet {
            eprintln!(
                "Wrote {} examples ({} records, {} passages)",
                report.examples(),
                report.records,
                report.passages
            );
        }
        if report.skipped > 0 {
            log::warn!("{} record(s) skipped", report.skipped);
        }

        Ok(())
    }
}
