//! Main token service implementation

use tracing::{debug, info, warn};

use crate::domain::entities::principal::AuthPrincipal;
use crate::domain::entities::token::{
    DecodedToken, TokenId, TokenKind, TokenRecord, TokenState, DEFAULT_TOKEN_TYPE,
};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::TokenStore;

use super::clock::{Clock, SystemClock};
use super::codec::{mask_token, TokenCodec};
use super::config::TokenServiceConfig;
use super::policy::ExpirationPolicy;

/// Service issuing and resolving opaque bearer tokens
///
/// Signatures and lifetimes are checked without touching the store. The store
/// only holds the record a valid token points at.
pub struct TokenService<S: TokenStore, C: Clock = SystemClock> {
    pub(crate) store: S,
    codec: TokenCodec,
    policy: ExpirationPolicy,
    clock: C,
}

impl<S: TokenStore> TokenService<S, SystemClock> {
    /// Creates a new token service instance on the system clock
    ///
    /// # Arguments
    ///
    /// * `store` - Token record store
    /// * `config` - Token service configuration
    ///
    /// # Returns
    ///
    /// A new `TokenService`, or `DomainError::Validation` if the signing
    /// configuration is inconsistent
    pub fn new(store: S, config: TokenServiceConfig) -> DomainResult<Self> {
        Self::with_clock(store, config, SystemClock)
    }
}

impl<S: TokenStore, C: Clock> TokenService<S, C> {
    /// Creates a new token service with an explicit time source
    pub fn with_clock(store: S, config: TokenServiceConfig, clock: C) -> DomainResult<Self> {
        let codec = TokenCodec::new(config.secret, config.signature_scheme, config.accept_legacy)?;
        config.policy.log_resolved();
        info!(
            scheme = %codec.scheme(),
            accept_legacy = codec.accepts_legacy(),
            "Token service initialized"
        );

        Ok(Self {
            store,
            codec,
            policy: config.policy,
            clock,
        })
    }

    pub fn policy(&self) -> &ExpirationPolicy {
        &self.policy
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Issues a new token
    ///
    /// # Arguments
    ///
    /// * `kind` - Token kind, which fixes the wire prefix and lifetime
    /// * `token_type` - Record type label, `"access"` when absent
    /// * `principal` - Principal the token speaks for
    /// * `state` - Opaque state returned by `lookup`
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The wire token
    /// * `Err(DomainError::Store)` - The record could not be persisted
    pub async fn create(
        &self,
        kind: TokenKind,
        token_type: Option<&str>,
        principal: Option<AuthPrincipal>,
        state: Option<TokenState>,
    ) -> DomainResult<String> {
        let id = TokenId::generate(self.clock.now_millis());
        let record = TokenRecord::new(
            id,
            token_type.unwrap_or(DEFAULT_TOKEN_TYPE),
            principal,
            state,
        );

        self.store
            .put(&id, &record, self.policy.persistence_ttl_seconds())
            .await?;

        let token = self.codec.encode(kind, &id, self.policy.ttl_for(kind));
        info!(
            kind = %kind,
            token_type = %record.token_type,
            token_id = %id,
            principal = ?record.principal.map(|p| p.kind),
            "Token issued"
        );
        Ok(token)
    }

    /// Issues an access token for a principal
    pub async fn create_for_principal(
        &self,
        principal: AuthPrincipal,
        state: Option<TokenState>,
    ) -> DomainResult<String> {
        self.create(TokenKind::Access, None, Some(principal), state)
            .await
    }

    /// Decodes a token and applies the expiration policy without a store lookup
    ///
    /// # Returns
    ///
    /// * `Ok(DecodedToken)` - Signature and lifetime check out
    /// * `Err(TokenError)` - The reason the token was rejected
    pub fn validate(&self, token: &str) -> Result<DecodedToken, TokenError> {
        let decoded = self.codec.decode(token)?;
        self.policy.check(
            decoded.kind,
            &decoded.id,
            decoded.expires,
            self.clock.now_millis(),
        )?;
        Ok(decoded)
    }

    /// Resolves a token to its record
    ///
    /// Keeps the rejection reasons apart: `Token(..)` for decode and policy
    /// failures, `NotFound` when the store has no record and `Store(..)` for
    /// store failures.
    pub(crate) async fn resolve(&self, token: &str) -> DomainResult<TokenRecord> {
        let decoded = self.validate(token)?;
        self.store
            .get(&decoded.id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                resource: format!("token record {}", decoded.id),
            })
    }

    /// Looks up the record behind a token
    ///
    /// Updates the access time on success. That write is best-effort: a
    /// failure is logged and the record is still returned.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(TokenRecord))` - Token is valid and its record exists
    /// * `Ok(None)` - Token is not valid
    /// * `Err(DomainError::Store)` - The record could not be read
    pub async fn lookup(&self, token: &str) -> DomainResult<Option<TokenRecord>> {
        let mut record = match self.resolve(token).await {
            Ok(record) => record,
            Err(e) if e.is_token_not_valid() => {
                self.log_not_valid(token, &e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let accessed = record.mark_accessed(self.clock.now_millis());
        if let Err(e) = self
            .store
            .set_accessed(&record.id, accessed, self.policy.persistence_ttl_seconds())
            .await
        {
            warn!(token_id = %record.id, error = %e, "Failed to record token access");
        }

        Ok(Some(record))
    }

    /// Records an access without reading the record
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Token is valid and its access time was updated
    /// * `Ok(false)` - Token is not valid or its record is gone
    /// * `Err(DomainError::Store)` - The store could not be written
    pub async fn touch(&self, token: &str) -> DomainResult<bool> {
        let decoded = match self.validate(token) {
            Ok(decoded) => decoded,
            Err(e) => {
                self.log_not_valid(token, &DomainError::Token(e));
                return Ok(false);
            }
        };

        let found = self
            .store
            .set_accessed(
                &decoded.id,
                self.clock.now_millis(),
                self.policy.persistence_ttl_seconds(),
            )
            .await?;
        if !found {
            debug!(token = %mask_token(token), reason = "not_found", "Token not valid");
        }
        Ok(found)
    }

    /// Exchanges a valid token for a new access token bound to the same id
    ///
    /// The record is written back with a fresh access time, which also resets
    /// its store retention.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(String))` - The new access token
    /// * `Ok(None)` - Token is not valid
    /// * `Err(DomainError::Store)` - The record could not be read or written
    pub async fn refresh(&self, token: &str) -> DomainResult<Option<String>> {
        let mut record = match self.resolve(token).await {
            Ok(record) => record,
            Err(e) if e.is_token_not_valid() => {
                self.log_not_valid(token, &e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        record.mark_accessed(self.clock.now_millis());
        self.store
            .put(&record.id, &record, self.policy.persistence_ttl_seconds())
            .await?;

        let access = self.codec.encode(
            TokenKind::Access,
            &record.id,
            self.policy.ttl_for(TokenKind::Access),
        );
        info!(token_id = %record.id, "Token refreshed");
        Ok(Some(access))
    }

    fn log_not_valid(&self, token: &str, error: &DomainError) {
        let reason = match error {
            DomainError::Token(e) => e.reason(),
            _ => "not_found",
        };
        debug!(token = %mask_token(token), reason, "Token not valid");
    }
}
