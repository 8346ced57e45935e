//! Error types for the shell engine.

use thiserror::Error;

/// Result type for shell operations.
pub type Result<T> = std::result::Result<T, ShellError>;

/// Errors that can occur while driving the shell.
#[derive(Error, Debug)]
pub enum ShellError {
    /// A scale value that is not a finite number above zero.
    #[error("invalid scale factor: {0}")]
    InvalidScale(String),

    /// An inbound content message that could not be understood.
    #[error("invalid content message: {0}")]
    InvalidMessage(String),

    /// An inbound content message on a channel the shell does not serve.
    #[error("unknown message channel `{0}`")]
    UnknownChannel(String),

    /// Packaged content could not be served.
    #[error("content unavailable: {0}")]
    Content(String),

    /// The native window rejected an operation.
    #[error("window operation failed: {0}")]
    Window(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
