//! Error types for paramexport.
//!
//! Library crates use [`ExportError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all paramexport operations.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error talking to the Jenkins controller.
    #[error("network error: {0}")]
    Network(String),

    /// XML parsing error for a job configuration document.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Cache store read/write error.
    #[error("store error: {0}")]
    Store(String),

    /// Data validation error (unexpected payload shape, invalid format, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ExportError>;

impl ExportError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ExportError::config("missing Jenkins URL");
        assert_eq!(err.to_string(), "config error: missing Jenkins URL");

        let err = ExportError::parse("unexpected closing tag at line 12");
        assert!(err.to_string().contains("line 12"));
    }
}
