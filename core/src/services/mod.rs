//! Business services containing token logic.

pub mod token;

// Re-export commonly used types
pub use token::{
    Clock, ExpirationPolicy, ManualClock, SignatureScheme, SystemClock, TokenCodec,
    TokenSecret, TokenService, TokenServiceConfig,
};
