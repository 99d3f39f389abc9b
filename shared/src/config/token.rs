//! Token issuance and verification configuration
//!
//! All expiry values are in milliseconds. An override that is missing or not
//! positive leaves the built-in default for that token kind in place.

use serde::{Deserialize, Serialize};

/// Signing salt used when none is configured
pub const DEFAULT_SECRET_SALT: &str = "super secret token value";

/// Token configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// Process-wide signing secret
    pub secret_salt: String,

    /// Access token expiry override in milliseconds
    #[serde(default)]
    pub access_expires: Option<i64>,

    /// Refresh token expiry override in milliseconds
    #[serde(default)]
    pub refresh_expires: Option<i64>,

    /// Email token expiry override in milliseconds
    #[serde(default)]
    pub email_expires: Option<i64>,

    /// Offline token expiry override in milliseconds
    #[serde(default)]
    pub offline_expires: Option<i64>,

    /// Store retention for token records in milliseconds
    #[serde(default)]
    pub persistence_expires: Option<i64>,

    /// Signature scheme for newly issued tokens ("legacy-sha1" or "hmac-sha256")
    #[serde(default = "default_signature_scheme")]
    pub signature_scheme: String,

    /// Whether tokens signed with the legacy scheme are still accepted
    #[serde(default = "default_accept_legacy")]
    pub accept_legacy: bool,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret_salt: String::from(DEFAULT_SECRET_SALT),
            access_expires: None,
            refresh_expires: None,
            email_expires: None,
            offline_expires: None,
            persistence_expires: None,
            signature_scheme: default_signature_scheme(),
            accept_legacy: default_accept_legacy(),
        }
    }
}

impl TokenConfig {
    /// Create a new token configuration with secret
    pub fn new(secret_salt: impl Into<String>) -> Self {
        Self {
            secret_salt: secret_salt.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    ///
    /// Reads `AUTH_TOKEN_SECRET_SALT`, `AUTH_TOKEN_<KIND>_EXPIRES` for the
    /// access, refresh, email, offline and persistence settings,
    /// `AUTH_TOKEN_SIGNATURE_SCHEME` and `AUTH_TOKEN_ACCEPT_LEGACY`.
    pub fn from_env() -> Self {
        let secret_salt = std::env::var("AUTH_TOKEN_SECRET_SALT")
            .unwrap_or_else(|_| DEFAULT_SECRET_SALT.to_string());
        let signature_scheme = std::env::var("AUTH_TOKEN_SIGNATURE_SCHEME")
            .unwrap_or_else(|_| default_signature_scheme());
        let accept_legacy = std::env::var("AUTH_TOKEN_ACCEPT_LEGACY")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_else(default_accept_legacy);

        Self {
            secret_salt,
            access_expires: expires_from_env("access"),
            refresh_expires: expires_from_env("refresh"),
            email_expires: expires_from_env("email"),
            offline_expires: expires_from_env("offline"),
            persistence_expires: expires_from_env("persistence"),
            signature_scheme,
            accept_legacy,
        }
    }

    /// Set access token expiry in milliseconds
    pub fn with_access_expires(mut self, millis: i64) -> Self {
        self.access_expires = Some(millis);
        self
    }

    /// Set refresh token expiry in milliseconds
    pub fn with_refresh_expires(mut self, millis: i64) -> Self {
        self.refresh_expires = Some(millis);
        self
    }

    /// Set record retention in milliseconds
    pub fn with_persistence_expires(mut self, millis: i64) -> Self {
        self.persistence_expires = Some(millis);
        self
    }

    /// Set the signature scheme used for new tokens
    pub fn with_signature_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.signature_scheme = scheme.into();
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret_salt == DEFAULT_SECRET_SALT
    }
}

fn expires_from_env(name: &str) -> Option<i64> {
    let key = format!("AUTH_TOKEN_{}_EXPIRES", name.to_uppercase());
    std::env::var(key).ok().and_then(|value| value.trim().parse().ok())
}

fn default_signature_scheme() -> String {
    String::from("legacy-sha1")
}

fn default_accept_legacy() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_config_default() {
        let config = TokenConfig::default();
        assert!(config.is_using_default_secret());
        assert_eq!(config.signature_scheme, "legacy-sha1");
        assert!(config.accept_legacy);
        assert!(config.access_expires.is_none());
        assert!(config.persistence_expires.is_none());
    }

    #[test]
    fn test_token_config_builders() {
        let config = TokenConfig::new("pepper")
            .with_access_expires(60_000)
            .with_refresh_expires(120_000)
            .with_persistence_expires(3_600_000)
            .with_signature_scheme("hmac-sha256");

        assert!(!config.is_using_default_secret());
        assert_eq!(config.access_expires, Some(60_000));
        assert_eq!(config.refresh_expires, Some(120_000));
        assert_eq!(config.persistence_expires, Some(3_600_000));
        assert_eq!(config.signature_scheme, "hmac-sha256");
    }

    #[test]
    fn test_token_config_deserialize_with_defaults() {
        let config: TokenConfig =
            serde_json::from_str(r#"{"secret_salt":"s3cret","email_expires":1000}"#).unwrap();

        assert_eq!(config.secret_salt, "s3cret");
        assert_eq!(config.email_expires, Some(1000));
        assert_eq!(config.offline_expires, None);
        assert_eq!(config.signature_scheme, "legacy-sha1");
        assert!(config.accept_legacy);
    }
}
