//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `cache` - Redis connection and key namespacing
//! - `environment` - Environment detection and logging configuration
//! - `token` - Token signing secret, expiry overrides and signature scheme

pub mod cache;
pub mod environment;
pub mod token;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use cache::CacheConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use token::{TokenConfig, DEFAULT_SECRET_SALT};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Token configuration
    #[serde(default)]
    pub token: TokenConfig,

    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            token: TokenConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            token: TokenConfig::default(),
            cache: CacheConfig::default().with_prefix("tokenkeep_dev"),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            token: TokenConfig::new("use-env-variable")
                .with_signature_scheme("hmac-sha256"),
            cache: CacheConfig::new("redis://prod-cache:6379").with_prefix("tokenkeep"),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Load configuration from environment
    ///
    /// Token and cache settings always come from the environment; the
    /// environment only selects logging defaults.
    pub fn from_env() -> Self {
        let env = Environment::from_env();
        Self {
            environment: env,
            token: TokenConfig::from_env(),
            cache: CacheConfig::from_env(),
            logging: LoggingConfig::for_environment(env).with_env_overrides(),
        }
    }
}
