//! Error types for Cloudgram operations.
//!
//! This module provides the main error type [`CloudgramError`] which wraps
//! the failures that can occur between receiving a specification and
//! returning the path of the rendered image.

use std::io;

use thiserror::Error;

use cloudgram_core::SpecError;

/// The main error type for Cloudgram operations.
///
/// Only [`CloudgramError::Validation`] is caused by the caller's input; the
/// other variants indicate an environment or rendering failure.
#[derive(Debug, Error)]
pub enum CloudgramError {
    #[error("Invalid diagram: {0}")]
    Validation(#[from] SpecError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Raster error: {0}")]
    Raster(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CloudgramError {
    /// Returns true if the error was caused by an invalid specification.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_validation() {
        assert!(CloudgramError::from(SpecError::NoNodes).is_validation());
        assert!(!CloudgramError::Raster("bad".to_string()).is_validation());
        assert!(!CloudgramError::from(io::Error::other("disk full")).is_validation());
    }

    #[test]
    fn test_validation_message_includes_cause() {
        let err = CloudgramError::from(SpecError::DuplicateNodeId("web".to_string()));
        assert_eq!(
            err.to_string(),
            "Invalid diagram: node id `web` is declared more than once"
        );
    }
}
