//! Configuration for the token service

use std::str::FromStr;

use tk_shared::config::{TokenConfig, DEFAULT_SECRET_SALT};
use tracing::warn;

use crate::domain::entities::token::TokenKind;
use crate::errors::DomainError;

use super::codec::{SignatureScheme, TokenSecret};
use super::policy::ExpirationPolicy;

/// Configuration for the token service
///
/// Built once before the service starts and never changed afterwards.
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Signing secret
    pub secret: TokenSecret,
    /// Scheme for newly issued tokens
    pub signature_scheme: SignatureScheme,
    /// Whether untagged legacy tokens still verify
    pub accept_legacy: bool,
    /// Token lifetimes and record retention
    pub policy: ExpirationPolicy,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            secret: TokenSecret::new(DEFAULT_SECRET_SALT),
            signature_scheme: SignatureScheme::LegacySha1,
            accept_legacy: true,
            policy: ExpirationPolicy::default(),
        }
    }
}

impl TokenServiceConfig {
    /// Default configuration with the given secret
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: TokenSecret::new(secret),
            ..Default::default()
        }
    }

    pub fn policy(mut self, policy: ExpirationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn scheme(mut self, scheme: SignatureScheme) -> Self {
        self.signature_scheme = scheme;
        self
    }

    pub fn accept_legacy(mut self, accept: bool) -> Self {
        self.accept_legacy = accept;
        self
    }
}

impl TryFrom<&TokenConfig> for TokenServiceConfig {
    type Error = DomainError;

    fn try_from(config: &TokenConfig) -> Result<Self, Self::Error> {
        let signature_scheme = SignatureScheme::from_str(&config.signature_scheme)
            .map_err(|message| DomainError::Validation { message })?;

        if config.is_using_default_secret() {
            warn!("Token secret salt is the built-in default; set AUTH_TOKEN_SECRET_SALT");
        }

        let policy = ExpirationPolicy::builder()
            .ttl(TokenKind::Access, config.access_expires)
            .ttl(TokenKind::Refresh, config.refresh_expires)
            .ttl(TokenKind::Email, config.email_expires)
            .ttl(TokenKind::Offline, config.offline_expires)
            .max_persistence_age(config.persistence_expires)
            .build();

        Ok(Self {
            secret: TokenSecret::new(config.secret_salt.clone()),
            signature_scheme,
            accept_legacy: config.accept_legacy,
            policy,
        })
    }
}
