//! Engine error types

use marctune_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Domain layer error
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// I/O error on a named file or directory
    #[error("I/O error on {}: {source}", path.display())]
    File {
        /// The path being read or written
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// I/O error on an unnamed stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML that could not be parsed (strict mode)
    #[error("XML parse error at byte {position}: {message}")]
    Parse {
        /// Byte offset in the input where the error was detected
        position: u64,
        /// Parser message
        message: String,
    },

    /// Record element that does not follow the MARCXML layout
    #[error("invalid MARC record: {0}")]
    InvalidRecord(String),

    /// Configuration error
    #[error("invalid configuration: {0}")]
    ConfigError(String),

    /// JSON serialization error
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl EngineError {
    /// Wrap an I/O error with the path it occurred on
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::File {
            path: path.into(),
            source,
        }
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
