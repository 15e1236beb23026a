//! MARC21 domain model for the marctune tool set
//!
//! This crate holds everything that does not touch the filesystem:
//!
//! - **Chunk accounting**: [`Threshold`] and [`ChunkAccumulator`] decide when a
//!   buffered run of serialized records becomes a chunk file.
//! - **Record model**: [`Record`] with control and data fields, rendered in the
//!   mnemonic `=TAG  II$aValue` form.
//! - **Catalog metadata**: [`BookMetadata`] extracted from a record.
//! - **Prompt templates**: embedded chat templates for training examples and
//!   inference requests.
//! - **Display formatting**: post-processing of generated MARC text.
//!
//! # Example
//!
//! ```rust
//! use marctune_core::{ChunkAccumulator, Threshold};
//!
//! let mut acc = ChunkAccumulator::new(Threshold::Records(2)).unwrap();
//! acc.append("<record/>\n".to_string());
//! assert!(!acc.should_flush());
//! acc.append("<record/>\n".to_string());
//! assert!(acc.should_flush());
//! ```

#![warn(missing_docs)]

pub mod display;
pub mod error;
pub mod metadata;
pub mod prompt;
pub mod record;
pub mod text;
pub mod threshold;

pub use display::format_for_display;
pub use error::{CoreError, Result};
pub use metadata::BookMetadata;
pub use prompt::{PromptTemplate, TemplateVars};
pub use record::{ControlField, DataField, Field, Record, Subfield};
pub use text::chunk_text;
pub use threshold::{ChunkAccumulator, Threshold};
