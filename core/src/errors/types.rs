//! Token and store error types
//!
//! `TokenError` carries the reason a wire string was rejected. Callers of
//! `lookup` and `touch` only ever see "not valid"; the distinct variants exist
//! for logging and for `validate`.

use thiserror::Error;

/// Token decoding and validation errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("Unknown token kind")]
    UnknownKind,

    #[error("Malformed token")]
    Malformed,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,
}

impl TokenError {
    /// Short machine-readable reason used as a log field
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::UnknownKind => "unknown_kind",
            TokenError::Malformed => "malformed",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::Expired => "expired",
        }
    }
}

/// Token store errors
///
/// Raised by `TokenStore` implementations. These are never collapsed into
/// "not valid" and always reach the caller.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Token store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Corrupt token record field '{field}': {message}")]
    Corrupt { field: String, message: String },

    #[error("Token record serialization failed: {message}")]
    Serialization { message: String },
}

impl StoreError {
    /// Convenience constructor for a corrupt field
    pub fn corrupt(field: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Corrupt {
            field: field.into(),
            message: message.into(),
        }
    }
}
