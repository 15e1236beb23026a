//! Domain error types

use thiserror::Error;

/// Errors raised by the pure domain layer
#[derive(Error, Debug)]
pub enum CoreError {
    /// Threshold of zero bytes or zero records
    #[error("invalid threshold: {reason}")]
    InvalidThreshold {
        /// Why the threshold was rejected
        reason: String,
    },

    /// Text chunk size of zero
    #[error("invalid chunk size: {size}")]
    InvalidChunkSize {
        /// The rejected size in characters
        size: usize,
    },

    /// Prompt template could not be parsed or refers to unknown placeholders
    #[error("template error: {0}")]
    Template(String),

    /// No built-in template with this name
    #[error("template '{name}' not found")]
    UnknownTemplate {
        /// The requested template name
        name: String,
    },
}

/// Result type for domain operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidThreshold {
            reason: "byte threshold must be greater than 0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid threshold: byte threshold must be greater than 0"
        );

        let err = CoreError::UnknownTemplate {
            name: "missing".to_string(),
        };
        assert_eq!(err.to_string(), "template 'missing' not found");
    }
}
