//! Configuration module
//!
//! The optional TOML file supplies defaults for `split` and `prepare`.
//! Command-line flags (and their environment variables) take precedence.

use crate::error::CliError;
use anyhow::{Context, Result};
use marctune_engine::{PrepareConfig, RecordTag, SplitConfig, Threshold, WrapperConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration structure
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct CliConfig {
    /// Split configuration
    #[serde(default)]
    pub split: SplitSection,

    /// Dataset preparation configuration
    #[serde(default)]
    pub prepare: PrepareSection,
}

impl CliConfig {
    /// Load a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| CliError::ConfigError(e.to_string()))?;
        Ok(config)
    }

    /// Load `path` if given, else the built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                log::debug!("loading configuration from {}", path.display());
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Check both sections against the engine's rules
    pub fn validate(&self) -> Result<()> {
        self.split.to_engine()?.validate()?;
        self.prepare.to_engine()?.validate()?;
        Ok(())
    }
}

/// Split-related configuration
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SplitSection {
    /// Directory receiving the chunk files
    pub output_dir: PathBuf,

    /// Chunk file name prefix
    pub prefix: String,

    /// Flush threshold, `{ bytes = N }` or `{ records = N }`
    pub threshold: Threshold,

    /// Index of the first chunk
    pub start_index: u32,

    /// Zero-padding width of the chunk index
    pub index_width: usize,

    /// Record element, optionally `{namespace}local`
    pub record_tag: String,

    /// Chunk root element
    pub root: String,

    /// Default namespace declared on the chunk root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Skip malformed fragments instead of failing
    pub recover: bool,
}

impl Default for SplitSection {
    fn default() -> Self {
        let defaults = SplitConfig::default();
        Self {
            output_dir: defaults.output_dir,
            prefix: defaults.prefix,
            threshold: defaults.threshold,
            start_index: defaults.start_index,
            index_width: defaults.index_width,
            record_tag: defaults.record_tag.to_string(),
            root: defaults.wrapper.root,
            namespace: defaults.wrapper.namespace,
            recover: defaults.recover,
        }
    }
}

impl SplitSection {
    /// Convert into an engine configuration (not yet validated)
    pub fn to_engine(&self) -> Result<SplitConfig> {
        Ok(SplitConfig {
            output_dir: self.output_dir.clone(),
            prefix: self.prefix.clone(),
            threshold: self.threshold,
            start_index: self.start_index,
            index_width: self.index_width,
            record_tag: self.record_tag.parse::<RecordTag>()?,
            wrapper: WrapperConfig {
                root: self.root.clone(),
                namespace: self.namespace.clone(),
            },
            recover: self.recover,
        })
    }
}

/// Dataset preparation configuration
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PrepareSection {
    /// Record element, optionally `{namespace}local`
    pub record_tag: String,

    /// Skip malformed fragments and undecodable records
    pub recover: bool,

    /// Maximum record examples (0 = no limit)
    pub max_records: usize,

    /// Maximum reference passage length in characters
    pub passage_chars: usize,

    /// Log progress every this many records
    pub progress_interval: usize,

    /// Custom training template file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
}

impl Default for PrepareSection {
    fn default() -> Self {
        let defaults = PrepareConfig::default();
        Self {
            record_tag: defaults.record_tag.to_string(),
            recover: defaults.recover,
            max_records: defaults.max_records.unwrap_or(0),
            passage_chars: defaults.passage_chars,
            progress_interval: defaults.progress_interval,
            template: None,
        }
    }
}

impl PrepareSection {
    /// Convert into an engine configuration (not yet validated)
    pub fn to_engine(&self) -> Result<PrepareConfig> {
        Ok(PrepareConfig {
            record_tag: self.record_tag.parse::<RecordTag>()?,
            recover: self.recover,
            max_records: (self.max_records > 0).then_some(self.max_records),
            passage_chars: self.passage_chars,
            progress_interval: self.progress_interval,
        })
    }
}
