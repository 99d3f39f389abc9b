//! Domain entities representing tokens and the principals they bind.

pub mod principal;
pub mod token;

// Re-export commonly used types
pub use principal::{AuthPrincipal, PrincipalKind};
pub use token::{
    DecodedToken, TokenId, TokenKind, TokenRecord, TokenState,
    DEFAULT_TOKEN_TYPE, ONE_DAY_MILLIS, ONE_WEEK_MILLIS,
};
