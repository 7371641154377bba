//! Error types for fastagi
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using AgiError
pub type Result<T> = std::result::Result<T, AgiError>;

/// Unified error type for AGI sessions and the FastAGI server
#[derive(Debug, Error)]
pub enum AgiError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// The channel hung up while a command was in flight
    #[error("hangup")]
    Hangup,

    /// The response line did not match `DDD result=...`
    #[error("failed to parse result: {line}")]
    Parse { line: String },

    /// The response parsed, but carried a status other than 200
    #[error("non-200 status code: {status}")]
    Status { status: u16, line: String },

    // -------------------------------------------------------------------------
    // Listener Errors
    // -------------------------------------------------------------------------
    #[error("failed to bind server on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to accept TCP connection: {0}")]
    Accept(#[source] std::io::Error),

    // -------------------------------------------------------------------------
    // Command Errors
    // -------------------------------------------------------------------------
    /// A command returned a value that could not be interpreted
    #[error("invalid {what}: {value:?}")]
    InvalidValue { what: &'static str, value: String },

    /// A dialplan application required by a command is not loaded
    #[error("{0} applications not loaded")]
    ApplicationUnavailable(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AgiError {
    /// Whether this error means the remote side hung up
    pub fn is_hangup(&self) -> bool {
        matches!(self, AgiError::Hangup)
    }

    /// Status code carried by a non-200 response, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            AgiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
