//! # Argument Errors
//!
//! Validation failures raised before any network activity: malformed
//! endpoints and keys/values that cannot be expressed on the line protocol.

use thiserror::Error;

/// Result alias for validation in this crate.
pub type ArgResult<T> = Result<T, InvalidArgument>;

/// An argument rejected before it reaches the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidArgument {
    /// Host was empty or only whitespace.
    #[error("host must not be empty")]
    EmptyHost,
    /// Port outside the store's deployment range.
    #[error("port {port} is out of range (must be greater than 5000 and at most 65535)")]
    PortOutOfRange { port: u32 },
    /// `"host:port"` text that could not be split or parsed.
    #[error("malformed address '{0}', expected host:port")]
    MalformedAddress(String),
    #[error("key must not be empty")]
    EmptyKey,
    /// Keys are single tokens on the wire.
    #[error("key must not contain whitespace or control characters")]
    KeyContainsWhitespace,
    #[error("value must not be empty")]
    EmptyValue,
    /// The store tokenizes on whitespace; only single interior spaces survive.
    #[error("value must not contain control characters, tabs, leading/trailing or repeated spaces")]
    ValueNotCanonical,
}
