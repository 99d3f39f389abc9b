//! Token service module for opaque bearer tokens
//!
//! This module handles all token-related operations including:
//! - Wire encoding, signing and verification
//! - Per-kind expiration policy
//! - Issuance, lookup, touch and refresh against a token store

mod clock;
mod codec;
mod config;
mod policy;
mod service;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{mask_token, SignatureScheme, TokenCodec, TokenSecret};
pub use config::TokenServiceConfig;
pub use policy::{ExpirationPolicy, ExpirationPolicyBuilder};
pub use service::TokenService;
