//! Wire format for opaque bearer tokens
//!
//! A token is `[tag] wire_prefix base64url_no_pad(payload)` where the payload is
//!
//! ```text
//! bytes  0..16   token id, big-endian
//! bytes 16..24   absolute expiry, i64 big-endian (access and refresh only)
//! last 20 bytes  signature
//! ```
//!
//! The signature covers `signing_prefix || id || [secret] || expiry` with the
//! expiry written in decimal and `i64::MAX` standing in for kinds without one.
//! Legacy tokens carry no tag and sign with SHA-1 over the secret-salted
//! message. Tokens tagged `v2.` sign with HMAC-SHA256 keyed by the secret,
//! truncated to 20 bytes.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};
use sha2::Sha256;

use crate::domain::entities::token::{DecodedToken, TokenId, TokenKind};
use crate::errors::{DomainError, TokenError};

type HmacSha256 = Hmac<Sha256>;

const ID_LEN: usize = 16;
const EXPIRY_LEN: usize = 8;
const SIGNATURE_LEN: usize = 20;
const SHORT_PAYLOAD_LEN: usize = ID_LEN + SIGNATURE_LEN;
const LONG_PAYLOAD_LEN: usize = ID_LEN + EXPIRY_LEN + SIGNATURE_LEN;

/// Expiry written into the signature for kinds without an embedded one
const NO_EXPIRY: i64 = i64::MAX;

/// How token signatures are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    /// SHA-1 over the salted message, untagged on the wire
    LegacySha1,
    /// Truncated HMAC-SHA256, tagged `v2.` on the wire
    HmacSha256,
}

impl SignatureScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureScheme::LegacySha1 => "legacy-sha1",
            SignatureScheme::HmacSha256 => "hmac-sha256",
        }
    }

    /// Text placed in front of the wire prefix
    pub fn wire_tag(&self) -> &'static str {
        match self {
            SignatureScheme::LegacySha1 => "",
            SignatureScheme::HmacSha256 => "v2.",
        }
    }
}

impl Default for SignatureScheme {
    fn default() -> Self {
        SignatureScheme::LegacySha1
    }
}

impl std::fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SignatureScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "legacy-sha1" | "sha1" => Ok(SignatureScheme::LegacySha1),
            "hmac-sha256" | "v2" => Ok(SignatureScheme::HmacSha256),
            _ => Err(format!("Invalid signature scheme: {}", s)),
        }
    }
}

/// Signing secret
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(String);

impl TokenSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenSecret(***)")
    }
}

/// Encodes, signs and verifies wire tokens
///
/// Holds no mutable state and can be shared freely once built.
#[derive(Clone)]
pub struct TokenCodec {
    secret: TokenSecret,
    mac: HmacSha256,
    scheme: SignatureScheme,
    accept_legacy: bool,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &self.secret)
            .field("scheme", &self.scheme)
            .field("accept_legacy", &self.accept_legacy)
            .finish()
    }
}

impl TokenCodec {
    /// Creates a codec issuing tokens with `scheme`
    ///
    /// # Arguments
    ///
    /// * `secret` - Signing secret shared by every token
    /// * `scheme` - Scheme used by `encode`
    /// * `accept_legacy` - Whether untagged SHA-1 tokens still verify
    ///
    /// # Returns
    ///
    /// The codec, or `DomainError::Validation` if the secret cannot key the MAC
    /// or legacy acceptance is disabled while issuing legacy tokens
    pub fn new(
        secret: TokenSecret,
        scheme: SignatureScheme,
        accept_legacy: bool,
    ) -> Result<Self, DomainError> {
        if scheme == SignatureScheme::LegacySha1 && !accept_legacy {
            return Err(DomainError::Validation {
                message: "legacy tokens cannot be issued while legacy acceptance is disabled"
                    .to_string(),
            });
        }
        let mac = HmacSha256::new_from_slice(secret.expose().as_bytes()).map_err(|e| {
            DomainError::Validation {
                message: format!("invalid token secret: {}", e),
            }
        })?;
        Ok(Self {
            secret,
            mac,
            scheme,
            accept_legacy,
        })
    }

    /// Scheme used for newly issued tokens
    pub fn scheme(&self) -> SignatureScheme {
        self.scheme
    }

    pub fn accepts_legacy(&self) -> bool {
        self.accept_legacy
    }

    /// Encodes a token with the configured scheme
    ///
    /// `ttl_millis` is only used for kinds that embed their expiry.
    pub fn encode(&self, kind: TokenKind, id: &TokenId, ttl_millis: i64) -> String {
        let scheme = self.scheme;
        let expiry = kind
            .carries_embedded_expiry()
            .then(|| id.created_millis().saturating_add(ttl_millis));

        let mut payload = Vec::with_capacity(LONG_PAYLOAD_LEN);
        payload.extend_from_slice(id.as_bytes());
        if let Some(expiry) = expiry {
            payload.extend_from_slice(&expiry.to_be_bytes());
        }
        payload.extend_from_slice(&self.sign(scheme, kind, id, expiry.unwrap_or(NO_EXPIRY)));

        format!(
            "{}{}{}",
            scheme.wire_tag(),
            kind.wire_prefix(),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    /// Decodes and verifies a wire token
    ///
    /// Expiry is not checked here.
    ///
    /// # Errors
    ///
    /// * `UnknownKind` - No known prefix
    /// * `Malformed` - Bad base64, wrong payload length or an id without a timestamp
    /// * `InvalidSignature` - Signature mismatch, or a legacy token while legacy
    ///   acceptance is disabled
    pub fn decode(&self, wire: &str) -> Result<DecodedToken, TokenError> {
        let (scheme, rest) = match wire.strip_prefix(SignatureScheme::HmacSha256.wire_tag()) {
            Some(rest) => (SignatureScheme::HmacSha256, rest),
            None => (SignatureScheme::LegacySha1, wire),
        };

        let kind = TokenKind::ALL
            .into_iter()
            .find(|kind| rest.starts_with(kind.wire_prefix()))
            .ok_or(TokenError::UnknownKind)?;

        let payload = URL_SAFE_NO_PAD
            .decode(&rest[kind.wire_prefix().len()..])
            .map_err(|_| TokenError::Malformed)?;

        let expected_len = if kind.carries_embedded_expiry() {
            LONG_PAYLOAD_LEN
        } else {
            SHORT_PAYLOAD_LEN
        };
        if payload.len() != expected_len {
            return Err(TokenError::Malformed);
        }

        let (body, signature) = payload.split_at(expected_len - SIGNATURE_LEN);
        let (id_bytes, expiry_bytes) = body.split_at(ID_LEN);

        let id_bytes: [u8; ID_LEN] = id_bytes.try_into().map_err(|_| TokenError::Malformed)?;
        let id = TokenId::from_bytes(id_bytes)?;

        let expiry = if kind.carries_embedded_expiry() {
            let bytes: [u8; EXPIRY_LEN] =
                expiry_bytes.try_into().map_err(|_| TokenError::Malformed)?;
            Some(i64::from_be_bytes(bytes))
        } else {
            None
        };

        if scheme == SignatureScheme::LegacySha1 && !self.accept_legacy {
            return Err(TokenError::InvalidSignature);
        }

        let expected = self.sign(scheme, kind, &id, expiry.unwrap_or(NO_EXPIRY));
        if !constant_time_eq(&expected, signature) {
            return Err(TokenError::InvalidSignature);
        }

        Ok(DecodedToken {
            kind,
            id,
            expires: expiry,
        })
    }

    fn sign(
        &self,
        scheme: SignatureScheme,
        kind: TokenKind,
        id: &TokenId,
        expiry: i64,
    ) -> [u8; SIGNATURE_LEN] {
        let id_text = id.to_string();
        let expiry_text = expiry.to_string();
        let mut signature = [0u8; SIGNATURE_LEN];

        match scheme {
            SignatureScheme::LegacySha1 => {
                let mut hasher = Sha1::new();
                hasher.update(kind.signing_prefix().as_bytes());
                hasher.update(id_text.as_bytes());
                hasher.update(self.secret.expose().as_bytes());
                hasher.update(expiry_text.as_bytes());
                signature.copy_from_slice(&hasher.finalize());
            }
            SignatureScheme::HmacSha256 => {
                let mut mac = self.mac.clone();
                mac.update(kind.signing_prefix().as_bytes());
                mac.update(id_text.as_bytes());
                mac.update(expiry_text.as_bytes());
                let digest = mac.finalize().into_bytes();
                signature.copy_from_slice(&digest[..SIGNATURE_LEN]);
            }
        }

        signature
    }
}

/// Shortened form of a wire token that is safe to log
pub fn mask_token(wire: &str) -> String {
    let visible: String = wire.chars().take(8).collect();
    if wire.chars().count() > 8 {
        format!("{}***", visible)
    } else {
        "***".to_string()
    }
}
