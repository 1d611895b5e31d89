//! Error type shared by the reader, tokenizer, coordinator and sinks.

use std::io;
use thiserror::Error;

/// Errors that can occur while ingesting and encoding BED data.
#[derive(Error, Debug)]
pub enum StarchError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A growable buffer could not be extended. Never retried.
    #[error("Resource exhausted: could not grow {what} to {requested} bytes")]
    ResourceExhausted { what: &'static str, requested: usize },

    #[error("Pipeline failure: {0}")]
    Pipeline(String),
}

pub type Result<T> = std::result::Result<T, StarchError>;

impl StarchError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        StarchError::Parse {
            line,
            message: message.into(),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for StarchError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StarchError::Pipeline("shared buffer lock poisoned".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message() {
        let err = StarchError::parse(7, "Invalid start position: 'abc'");
        assert_eq!(
            err.to_string(),
            "Parse error at line 7: Invalid start position: 'abc'"
        );
    }

    #[test]
    fn test_resource_exhausted_message() {
        let err = StarchError::ResourceExhausted {
            what: "encoded output",
            requested: 4096,
        };
        assert!(err.to_string().contains("encoded output"));
        assert!(err.to_string().contains("4096"));
    }
}
