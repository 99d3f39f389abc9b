//! Per-kind token lifetimes

use tracing::info;

use crate::domain::entities::token::{TokenId, TokenKind, ONE_WEEK_MILLIS};
use crate::errors::TokenError;

/// Token lifetimes, fixed once built
///
/// Validity is always measured from the creation time embedded in the token
/// id, so shortening a lifetime immediately invalidates older tokens of that
/// kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpirationPolicy {
    access_millis: i64,
    refresh_millis: i64,
    email_millis: i64,
    offline_millis: i64,
    max_persistence_age_millis: i64,
}

impl Default for ExpirationPolicy {
    fn default() -> Self {
        Self {
            access_millis: TokenKind::Access.default_ttl_millis(),
            refresh_millis: TokenKind::Refresh.default_ttl_millis(),
            email_millis: TokenKind::Email.default_ttl_millis(),
            offline_millis: TokenKind::Offline.default_ttl_millis(),
            max_persistence_age_millis: ONE_WEEK_MILLIS,
        }
    }
}

impl ExpirationPolicy {
    /// Start from the built-in lifetimes
    pub fn builder() -> ExpirationPolicyBuilder {
        ExpirationPolicyBuilder {
            policy: Self::default(),
        }
    }

    /// Lifetime of `kind` in milliseconds
    pub fn ttl_for(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Access => self.access_millis,
            TokenKind::Refresh => self.refresh_millis,
            TokenKind::Email => self.email_millis,
            TokenKind::Offline => self.offline_millis,
        }
    }

    /// Store retention for token records in milliseconds
    pub fn max_persistence_age(&self) -> i64 {
        self.max_persistence_age_millis
    }

    /// Store retention in whole seconds, never less than one
    pub fn persistence_ttl_seconds(&self) -> u64 {
        u64::try_from(self.max_persistence_age_millis / 1000)
            .unwrap_or(0)
            .max(1)
    }

    /// Absolute expiry for a token of `kind` with id `id`
    pub fn expires_at(&self, kind: TokenKind, id: &TokenId) -> i64 {
        id.created_millis().saturating_add(self.ttl_for(kind))
    }

    /// Whether a decoded token is still within its lifetime at `now`
    pub fn is_valid(
        &self,
        kind: TokenKind,
        id: &TokenId,
        embedded_expiry: Option<i64>,
        now: i64,
    ) -> bool {
        if now > self.expires_at(kind, id) {
            return false;
        }
        match embedded_expiry {
            Some(expiry) if kind.carries_embedded_expiry() => now <= expiry,
            _ => true,
        }
    }

    /// Same as [`is_valid`](Self::is_valid) but reported as `TokenError::Expired`
    pub fn check(
        &self,
        kind: TokenKind,
        id: &TokenId,
        embedded_expiry: Option<i64>,
        now: i64,
    ) -> Result<(), TokenError> {
        if self.is_valid(kind, id, embedded_expiry, now) {
            Ok(())
        } else {
            Err(TokenError::Expired)
        }
    }

    /// Log the resolved lifetime of every kind
    pub fn log_resolved(&self) {
        for kind in TokenKind::ALL {
            info!(
                kind = kind.label(),
                ttl_ms = self.ttl_for(kind),
                "{} token expires after {} seconds",
                kind,
                self.ttl_for(kind) / 1000
            );
        }
        info!(
            ttl_ms = self.max_persistence_age_millis,
            "token records persist for {} seconds",
            self.max_persistence_age_millis / 1000
        );
    }
}

/// Builder for [`ExpirationPolicy`]
///
/// Overrides that are missing or not positive keep the current value.
#[derive(Debug, Clone)]
pub struct ExpirationPolicyBuilder {
    policy: ExpirationPolicy,
}

impl ExpirationPolicyBuilder {
    /// Override the lifetime of one kind
    pub fn ttl(mut self, kind: TokenKind, millis: Option<i64>) -> Self {
        if let Some(millis) = millis.filter(|m| *m > 0) {
            let slot = match kind {
                TokenKind::Access => &mut self.policy.access_millis,
                TokenKind::Refresh => &mut self.policy.refresh_millis,
                TokenKind::Email => &mut self.policy.email_millis,
                TokenKind::Offline => &mut self.policy.offline_millis,
            };
            *slot = millis;
        }
        self
    }

    /// Override the store retention
    pub fn max_persistence_age(mut self, millis: Option<i64>) -> Self {
        if let Some(millis) = millis.filter(|m| *m > 0) {
            self.policy.max_persistence_age_millis = millis;
        }
        self
    }

    pub fn build(self) -> ExpirationPolicy {
        self.policy
    }
}
