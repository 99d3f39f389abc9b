//! # Infrastructure Layer
//!
//! Concrete implementations behind the TokenKeep core:
//! - **Cache**: Redis client with retry logic and the Redis-backed token store
//! - **Logging**: tracing subscriber setup from `LoggingConfig`
//! - **Wiring**: configuration loading and token service construction

// Re-export core types for convenience
pub use tk_core::errors::*;

/// Cache module - Redis client and token store
pub mod cache;

/// Logging module - tracing subscriber setup
pub mod logging;

use tk_core::services::token::{TokenService, TokenServiceConfig};
use tk_shared::config::AppConfig;

use cache::{RedisClient, RedisTokenStore};

/// Token service backed by Redis
pub type RedisTokenService = TokenService<RedisTokenStore>;

/// Build the Redis-backed token service from configuration
///
/// This function sets up:
/// - The Redis connection (with retries)
/// - The token store over it
/// - The token service with the configured secret, scheme and lifetimes
pub async fn initialize(config: &AppConfig) -> Result<RedisTokenService, InfrastructureError> {
    tracing::info!(environment = %config.environment, "Initializing token service");

    if config.token.is_using_default_secret() {
        if config.environment.is_production() {
            return Err(InfrastructureError::Config(
                "default token secret is not allowed in production".to_string(),
            ));
        }
        tracing::warn!("Using the default token secret");
    }

    let service_config = TokenServiceConfig::try_from(&config.token)
        .map_err(|e| InfrastructureError::Config(e.to_string()))?;

    let client = RedisClient::new(config.cache.clone()).await?;
    let store = RedisTokenStore::new(client);
    let service = TokenService::new(store, service_config)
        .map_err(|e| InfrastructureError::Config(e.to_string()))?;

    tracing::info!("Token service initialized successfully");
    Ok(service)
}

/// Load application configuration from the environment
///
/// Reads a `.env` file first if one is present.
pub fn load_config() -> AppConfig {
    dotenvy::dotenv().ok();
    AppConfig::from_env()
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tk_shared::config::{Environment, TokenConfig};

    #[tokio::test]
    async fn test_initialize_rejects_default_secret_in_production() {
        let mut config = AppConfig::production();
        config.token = TokenConfig::default();
        assert_eq!(config.environment, Environment::Production);

        let result = initialize(&config).await;
        assert!(matches!(result, Err(InfrastructureError::Config(_))));
    }
}
