//! Protocol-layer errors.
//!
//! Malformed wire data is never fatal to the process; it degrades a single
//! event or request. These errors exist so callers can decide whether to drop
//! the offending input or surface a generic failure message.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding or decoding wire data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A server event envelope failed to decode.
    #[error("malformed server event: {0}")]
    MalformedEvent(String),

    /// A client directive envelope failed to encode or decode.
    #[error("malformed client directive: {0}")]
    MalformedDirective(String),

    /// A REST response body did not match the expected shape.
    #[error("malformed response body: {0}")]
    MalformedBody(String),
}
