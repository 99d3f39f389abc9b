//! Domain-specific error types and error handling.

mod types;

// Re-export all error types
pub use types::{StoreError, TokenError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DomainError {
    /// Whether this error means the token simply does not resolve
    ///
    /// Decode failures, policy rejections and missing records all collapse
    /// into the same outcome for `lookup` and `touch`.
    pub fn is_token_not_valid(&self) -> bool {
        matches!(self, DomainError::Token(_) | DomainError::NotFound { .. })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
