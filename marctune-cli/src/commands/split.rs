//! Split command implementation

use crate::config::CliConfig;
use crate::error::CliError;
use crate::input::resolve_inputs;
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use clap::Args;
use marctune_engine::{RecordTag, SplitConfig, Splitter, Threshold, WrapperConfig};
use std::path::PathBuf;

/// Arguments for the split command
#[derive(Debug, Args)]
pub struct SplitArgs {
    /// Input files, directories or glob patterns
    #[arg(value_name = "PATH/PATTERN", required = true)]
    pub input: Vec<String>,

    /// Directory receiving the chunk files
    #[arg(short, long, value_name = "DIR", env = "MARCTUNE_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Flush after this many encoded bytes
    #[arg(short, long, value_name = "N", conflicts_with = "records")]
    pub bytes: Option<u64>,

    /// Flush after this many records
    #[arg(short, long, value_name = "N")]
    pub records: Option<usize>,

    /// Chunk file name prefix
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Index of the first chunk
    #[arg(short, long, value_name = "N")]
    pub start_index: Option<u32>,

    /// Zero-padding width of the chunk index
    #[arg(short, long, value_name = "N")]
    pub width: Option<usize>,

    /// Record element, `record` or `{namespace}record`
    #[arg(short, long, value_name = "TAG")]
    pub tag: Option<String>,

    /// Chunk root element
    #[arg(long, value_name = "NAME")]
    pub root: Option<String>,

    /// Default namespace declared on the chunk root
    #[arg(long, value_name = "URI")]
    pub namespace: Option<String>,

    /// Fail on the first malformed fragment instead of skipping it
    #[arg(long)]
    pub strict: bool,
}

impl SplitArgs {
    /// Merge flags over the config file settings
    pub fn to_config(&self, config: &CliConfig) -> Result<SplitConfig> {
        let mut split = config.split.to_engine()?;

        if let Some(dir) = &self.output_dir {
            split.output_dir = dir.clone();
        }
        if let Some(bytes) = self.bytes {
            split.threshold = Threshold::Bytes(bytes);
        }
        if let Some(records) = self.records {
            split.threshold = Threshold::Records(records);
        }
        if let Some(prefix) = &self.prefix {
            split.prefix = prefix.clone();
        }
        if let Some(index) = self.start_index {
            split.start_index = index;
        }
        if let Some(width) = self.width {
            split.index_width = width;
        }
        if let Some(tag) = &self.tag {
            split.record_tag = tag.parse::<RecordTag>()?;
        }
        if self.root.is_some() || self.namespace.is_some() {
            split.wrapper = WrapperConfig {
                root: self.root.clone().unwrap_or(split.wrapper.root),
                namespace: self.namespace.clone().or(split.wrapper.namespace),
            };
        }
        if self.strict {
            split.recover = false;
        }

        split
            .validate()
            .map_err(|e| CliError::ConfigError(e.to_string()))?;
        Ok(split)
    }

    /// Execute the split command
    pub fn execute(&self, config: &CliConfig, quiet: bool) -> Result<()> {
        let split = self.to_config(config)?;
        let files = resolve_inputs(&self.input, &["xml"])?;

        log::info!("Starting split of {} file(s)", files.len());
        log::debug!("Configuration: {split:?}");

        let mut splitter = Splitter::new(split).context("Failed to prepare output directory")?;
        let mut progress = ProgressReporter::new(quiet);
        progress.init_files(files.len() as u64);

        for file in &files {
            let summary = splitter
                .split_path(file)
                .with_context(|| format!("Failed to split {}", file.display()))?;
            log::debug!("{}: {} records", file.display(), summary.records);
            progress.file_completed(&file.display().to_string());
        }
        progress.finish();

        let report = splitter.finish().context("Failed to write final chunk")?;

        if !quiet {
            println!(
                "Wrote {} records to {} chunk(s)",
                report.records,
                report.chunks.len()
            );
        }
        if !report.is_clean() {
            log::warn!("{} malformed fragment(s) skipped", report.skipped);
            if !quiet {
                println!("Skipped {} malformed fragment(s)", report.skipped);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> SplitArgs {
        SplitArgs {
            input: vec!["records.xml".to_string()],
            output_dir: None,
            bytes: None,
            records: None,
            prefix: None,
            start_index: None,
            width: None,
            tag: None,
            root: None,
            namespace: None,
            strict: false,
        }
    }

    #[test]
    fn test_defaults_from_config() {
        let config = args().to_config(&CliConfig::default()).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("marc_chunks"));
        assert_eq!(config.threshold, Threshold::default());
        assert!(config.recover);
    }

    #[test]
    fn test_flags_override_config() {
        let file = CliConfig::from_toml_str(
            "[split]\nprefix = \"lc_\"\nthreshold = { bytes = 1000 }\n",
        )
        .unwrap();

        let mut args = args();
        args.records = Some(50);
        args.output_dir = Some(PathBuf::from("out"));
        args.tag = Some("{http://www.loc.gov/MARC21/slim}record".to_string());
        args.strict = true;

        let config = args.to_config(&file).unwrap();
        assert_eq!(config.prefix, "lc_");
        assert_eq!(config.threshold, Threshold::Records(50));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.record_tag, RecordTag::marc21_slim());
        assert!(!config.recover);
    }

    #[test]
    fn test_wrapper_flags() {
        let mut args = args();
        args.namespace = Some("http://www.loc.gov/MARC21/slim".to_string());

        let config = args.to_config(&CliConfig::default()).unwrap();
        assert_eq!(config.wrapper.root, "collection");
        assert_eq!(
            config.wrapper.namespace.as_deref(),
            Some("http://www.loc.gov/MARC21/slim")
        );
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let mut args = args();
        args.records = Some(0);
        assert!(args.to_config(&CliConfig::default()).is_err());
    }
}
