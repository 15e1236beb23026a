//! Configuration types for the engine

use crate::error::{EngineError, Result};
use crate::xml::RecordTag;
use marctune_core::Threshold;
use std::path::PathBuf;

/// Root element wrapped around every chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperConfig {
    /// Root element name
    pub root: String,
    /// Default namespace declared on the root, if any
    pub namespace: Option<String>,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            root: "collection".to_string(),
            namespace: None,
        }
    }
}

impl WrapperConfig {
    fn validate(&self) -> Result<()> {
        let invalid = |c: char| c.is_whitespace() || matches!(c, '<' | '>' | '&' | '"' | '\'' | '/');
        if self.root.is_empty() || self.root.contains(invalid) {
            return Err(EngineError::ConfigError(format!(
                "invalid root element name: {:?}",
                self.root
            )));
        }
        if let Some(ns) = &self.namespace {
            if ns.contains(['<', '>', '"']) {
                return Err(EngineError::ConfigError(format!(
                    "invalid namespace: {ns:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Settings for one split run
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Directory receiving the chunk files
    pub output_dir: PathBuf,
    /// File name prefix before the chunk index
    pub prefix: String,
    /// Flush threshold
    pub threshold: Threshold,
    /// Index of the first chunk written
    pub start_index: u32,
    /// Zero-padding width of the chunk index
    pub index_width: usize,
    /// Repeating record element
    pub record_tag: RecordTag,
    /// Chunk root element
    pub wrapper: WrapperConfig,
    /// Skip malformed fragments instead of failing
    pub recover: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("marc_chunks"),
            prefix: "marc_chunk_".to_string(),
            threshold: Threshold::default(),
            start_index: 1,
            index_width: 3,
            record_tag: RecordTag::default(),
            wrapper: WrapperConfig::default(),
            recover: true,
        }
    }
}

impl SplitConfig {
    /// Creates a new builder for SplitConfig
    pub fn builder() -> SplitConfigBuilder {
        SplitConfigBuilder::new()
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        self.threshold.validate()?;

        if self.prefix.contains(['/', '\\']) {
            return Err(EngineError::ConfigError(format!(
                "chunk prefix must not contain path separators: {:?}",
                self.prefix
            )));
        }
        if !(1..=10).contains(&self.index_width) {
            return Err(EngineError::ConfigError(format!(
                "index width must be between 1 and 10, got {}",
                self.index_width
            )));
        }
        self.wrapper.validate()
    }
}

/// Builder for SplitConfig
#[derive(Debug, Default)]
pub struct SplitConfigBuilder {
    config: SplitConfig,
}

impl SplitConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output directory
    pub fn output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Set the chunk file prefix
    pub fn prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    /// Set the flush threshold
    pub fn threshold(mut self, threshold: Threshold) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Set the first chunk index
    pub fn start_index(mut self, index: u32) -> Self {
        self.config.start_index = index;
        self
    }

    /// Set the zero-padding width
    pub fn index_width(mut self, width: usize) -> Self {
        self.config.index_width = width;
        self
    }

    /// Set the record element
    pub fn record_tag(mut self, tag: RecordTag) -> Self {
        self.config.record_tag = tag;
        self
    }

    /// Set the chunk root element
    pub fn wrapper(mut self, wrapper: WrapperConfig) -> Self {
        self.config.wrapper = wrapper;
        self
    }

    /// Enable or disable recovery mode
    pub fn recover(mut self, recover: bool) -> Self {
        self.config.recover = recover;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<SplitConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Settings for dataset preparation
#[derive(Debug, Clone)]
pub struct PrepareConfig {
    /// Repeating record element
    pub record_tag: RecordTag,
    /// Skip malformed fragments instead of failing
    pub recover: bool,
    /// Stop after this many record examples (None = all)
    pub max_records: Option<usize>,
    /// Maximum passage length for reference documents, in characters
    pub passage_chars: usize,
    /// Log progress every this many records
    pub progress_interval: usize,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            record_tag: RecordTag::default(),
            recover: true,
            max_records: Some(10_000),
            passage_chars: 6_000,
            progress_interval: 10_000,
        }
    }
}

impl PrepareConfig {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.passage_chars == 0 {
            return Err(EngineError::ConfigError(
                "passage size must be greater than 0".to_string(),
            ));
        }
        if self.progress_interval == 0 {
            return Err(EngineError::ConfigError(
                "progress interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SplitConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.start_index, 1);
        assert_eq!(config.index_width, 3);
        assert!(config.recover);
        assert!(PrepareConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SplitConfig::builder()
            .output_dir("/tmp/chunks")
            .prefix("lc_")
            .threshold(Threshold::Records(500))
            .start_index(7)
            .recover(false)
            .build()
            .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/chunks"));
        assert_eq!(config.prefix, "lc_");
        assert_eq!(config.threshold, Threshold::Records(500));
        assert_eq!(config.start_index, 7);
        assert!(!config.recover);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(SplitConfig::builder().threshold(Threshold::Bytes(0)).build().is_err());
        assert!(SplitConfig::builder().prefix("a/b").build().is_err());
        assert!(SplitConfig::builder().index_width(0).build().is_err());
        assert!(SplitConfig::builder()
            .wrapper(WrapperConfig {
                root: "bad root".to_string(),
                namespace: None,
            })
            .build()
            .is_err());

        let prepare = PrepareConfig {
            passage_chars: 0,
            ..Default::default()
        };
        assert!(prepare.validate().is_err());
    }
}
