//! Error types for EmberKV
//!
//! Provides a unified error type for all operations.
//!
//! The reply-level variants (`Arity`, `UnknownCommand`, `InvalidKey`, `Store`)
//! render exactly the text sent back to the client in an error reply.

use thiserror::Error;

/// Result type alias using EmberError
pub type Result<T> = std::result::Result<T, EmberError>;

/// Unified error type for EmberKV operations
#[derive(Debug, Error)]
pub enum EmberError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors (connection-fatal)
    // -------------------------------------------------------------------------
    #[error("Framing error: {0}")]
    Framing(String),

    // -------------------------------------------------------------------------
    // Command Errors (reply-level, the session keeps going)
    // -------------------------------------------------------------------------
    #[error("{0}")]
    Arity(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    /// Reserved for backing stores that can fail; the in-memory store never does.
    #[error("store error: {0}")]
    Store(String),

    // -------------------------------------------------------------------------
    // Client Errors
    // -------------------------------------------------------------------------
    /// An error reply received from the server for a single call
    #[error("{0}")]
    Remote(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EmberError {
    /// Whether this error is an I/O error caused by the peer going away
    pub fn is_disconnect(&self) -> bool {
        match self {
            EmberError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}
