//! Error types for the warden-tools crate.

use std::io;

/// Errors that can occur during tool execution.
///
/// Every variant is a closed category; I/O failures are sorted into one by
/// [`ToolError::from_io`] using the error kind.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Invalid parameters passed to tool
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Refused by a path or command safety check
    #[error("Blocked: {0}")]
    Blocked(String),

    /// Target file or directory does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Permission denied for operation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Operation timed out
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Tool execution failed
    #[error("Execution error: {0}")]
    ExecutionError(String),
}

impl ToolError {
    /// Categorise an I/O failure while performing `action` on `target`.
    pub fn from_io(action: &str, target: &str, err: io::Error) -> Self {
        let message = format!("Failed to {action} '{target}': {err}");
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(message),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(message),
            io::ErrorKind::TimedOut => Self::Timeout(message),
            _ => Self::ExecutionError(message),
        }
    }
}
