//! Streaming MARCXML processing
//!
//! This crate reads large record-oriented XML documents one record at a time
//! and drives the two batch jobs of marctune:
//!
//! - [`Splitter`] re-serializes records into numbered, independently
//!   well-formed chunk files bounded by a [`Threshold`].
//! - [`DatasetBuilder`] turns records (and reference passages) into
//!   chat-formatted training examples.

#![warn(missing_docs)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod marcxml;
pub mod splitter;
pub mod writer;
pub mod xml;

// Re-export key types
pub use config::{PrepareConfig, SplitConfig, SplitConfigBuilder, WrapperConfig};
pub use dataset::{DatasetBuilder, PrepareReport, TrainingExample};
pub use error::{EngineError, Result};
pub use splitter::{split_files, ChunkInfo, FileSummary, SplitReport, Splitter};
pub use writer::ChunkWriter;
pub use xml::{RecordNode, RecordReader, RecordTag, XmlNode};

// Re-export from core for convenience
pub use marctune_core::{BookMetadata, Record, Threshold};
