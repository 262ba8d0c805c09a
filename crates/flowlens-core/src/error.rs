//! Application error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Terminal/TUI Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Terminal error: {message}")]
    Terminal { message: String },

    #[error("Failed to initialize terminal: {0}")]
    TerminalInit(String),

    #[error("Failed to restore terminal: {0}")]
    TerminalRestore(String),

    // ─────────────────────────────────────────────────────────────
    // Capture Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Capture file not found: {path}")]
    CaptureNotFound { path: PathBuf },

    #[error("Malformed capture file {path}: {message}")]
    CaptureMalformed { path: PathBuf, message: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// Whether the error is fatal (should terminate) or recoverable
    /// (degrade and keep the view alive).
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Json(_) => false,
            Error::Terminal { .. } => true,
            Error::TerminalInit(_) => true,
            Error::TerminalRestore(_) => true,
            Error::CaptureNotFound { .. } => true,
            Error::CaptureMalformed { .. } => true,
            Error::Config { .. } => false,
        }
    }
}

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Attach a terminal-layer context message to the error.
    fn terminal_context(self, message: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    fn terminal_context(self, message: &str) -> Result<T> {
        self.map_err(|e| Error::Terminal {
            message: format!("{message}: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_recoverable() {
        let err = Error::Config {
            message: "bad key".to_string(),
        };
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_terminal_errors_are_fatal() {
        let err = Error::TerminalInit("no tty".to_string());
        assert!(err.is_fatal());
    }

    #[test]
    fn test_terminal_context_wraps_message() {
        let res: std::result::Result<(), &str> = Err("boom");
        let err = res.terminal_context("entering raw mode").unwrap_err();
        assert!(err.to_string().contains("entering raw mode"));
        assert!(err.to_string().contains("boom"));
    }
}
