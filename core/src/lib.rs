//! # TokenKeep Core
//!
//! Domain layer for opaque bearer tokens: entities, error types, the token
//! store interface and the token service with its codec and expiration
//! policy.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    AuthPrincipal, DecodedToken, PrincipalKind, TokenId, TokenKind, TokenRecord, TokenState,
};
pub use errors::{DomainError, DomainResult, StoreError, TokenError};
pub use repositories::{MemoryTokenStore, TokenStore};
pub use services::{
    Clock, ExpirationPolicy, ManualClock, SignatureScheme, SystemClock, TokenCodec,
    TokenSecret, TokenService, TokenServiceConfig,
};
