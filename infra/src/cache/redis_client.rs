//! Redis client implementation
//!
//! Provides a multiplexed Redis connection with retry logic and the hash and
//! script operations the token store is built on.

use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult, Script};
use std::collections::HashMap;
use std::time::Duration;
use tk_shared::config::CacheConfig;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::InfrastructureError;

/// Upper bound for the exponential backoff between retries
const MAX_RETRY_DELAY_MS: u64 = 5000;

/// Redis client with retry logic
///
/// Cheap to clone; clones share the underlying multiplexed connection.
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
}

impl RedisClient {
    /// Create a new Redis client
    ///
    /// Retry count and base delay come from `config`.
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    ///
    /// # Returns
    /// * `Result<Self, InfrastructureError>` - Redis client or error
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "Creating Redis client");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!(error = %e, "Failed to parse Redis URL");
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection =
            Self::create_connection_with_retry(client, config.max_retries, config.retry_delay_ms)
                .await?;

        info!("Redis client created successfully");
        Ok(Self { connection, config })
    }

    /// Configuration this client was created with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Prefix `key` with the configured namespace
    pub fn make_key(&self, key: &str) -> String {
        self.config.make_key(key)
    }

    async fn create_connection_with_retry(
        client: Client,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!(attempt = attempts, "Connecting to Redis");

            match client.get_multiplexed_async_connection().await {
                Ok(connection) => return Ok(connection),
                Err(e) if attempts < max_retries => {
                    warn!(
                        attempt = attempts,
                        max_retries,
                        delay_ms = delay,
                        error = %e,
                        "Failed to connect to Redis, retrying"
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => {
                    error!(attempts, error = %e, "Failed to connect to Redis");
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Replace fields of a hash and set its expiry in one transaction
    ///
    /// # Arguments
    /// * `key` - Hash key
    /// * `fields` - Field/value pairs to write
    /// * `expiry_seconds` - Time to live in seconds
    pub async fn hset_with_expiry(
        &self,
        key: &str,
        fields: &[(String, String)],
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        debug!(key, fields = fields.len(), expiry_seconds, "Writing hash");

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();
                let fields = fields.to_vec();
                let expiry = expiry_seconds as i64;

                Box::pin(async move {
                    redis::pipe()
                        .atomic()
                        .del(&key)
                        .ignore()
                        .hset_multiple(&key, fields.as_slice())
                        .ignore()
                        .expire(&key, expiry)
                        .ignore()
                        .query_async::<_, ()>(&mut conn)
                        .await
                })
            })
            .await;

        result.map_err(|e| {
            error!(key, error = %e, "Failed to write hash");
            InfrastructureError::Cache(e)
        })
    }

    /// Read every field of a hash
    ///
    /// # Returns
    /// * `Ok(HashMap)` - Field map, empty if the key does not exist
    pub async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, InfrastructureError> {
        debug!(key, "Reading hash");

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();

                Box::pin(async move { conn.hgetall::<_, HashMap<String, String>>(key).await })
            })
            .await;

        result.map_err(|e| {
            error!(key, error = %e, "Failed to read hash");
            InfrastructureError::Cache(e)
        })
    }

    /// Run a Lua script against one key
    ///
    /// # Arguments
    /// * `script` - Prepared script, sent by hash with a fallback to its body
    /// * `key` - The single key the script operates on
    /// * `args` - Script arguments
    ///
    /// # Returns
    /// * `Ok(i64)` - The script's integer reply
    pub async fn eval_on_key(
        &self,
        script: &Script,
        key: &str,
        args: &[String],
    ) -> Result<i64, InfrastructureError> {
        debug!(key, "Running script");

        let result = self
            .execute_with_retry(|mut conn| {
                let script = script.clone();
                let key = key.to_string();
                let args = args.to_vec();

                Box::pin(async move {
                    let mut invocation = script.key(key);
                    for arg in &args {
                        invocation.arg(arg);
                    }
                    invocation.invoke_async::<_, i64>(&mut conn).await
                })
            })
            .await;

        result.map_err(|e| {
            error!(key, error = %e, "Script failed");
            InfrastructureError::Cache(e)
        })
    }

    /// Delete a key
    ///
    /// # Returns
    /// * `Ok(true)` if the key existed
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        debug!(key, "Deleting key");

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();

                Box::pin(async move { conn.del::<_, u32>(key).await })
            })
            .await;

        result.map(|deleted| deleted > 0).map_err(|e| {
            error!(key, error = %e, "Failed to delete key");
            InfrastructureError::Cache(e)
        })
    }

    /// Get time-to-live for a key
    ///
    /// # Returns
    /// * `Ok(Some(seconds))` - Key exists with an expiry
    /// * `Ok(None)` - Key does not exist or never expires
    pub async fn ttl(&self, key: &str) -> Result<Option<i64>, InfrastructureError> {
        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();

                Box::pin(async move { conn.ttl::<_, i64>(key).await })
            })
            .await;

        match result {
            Ok(ttl) if ttl >= 0 => Ok(Some(ttl)),
            Ok(_) => Ok(None),
            Err(e) => {
                error!(key, error = %e, "Failed to get TTL");
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Check if the Redis connection is healthy
    ///
    /// Performs a PING command to verify connectivity.
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let result = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await;

        match result {
            Ok(response) if response == "PONG" => Ok(true),
            Ok(response) => {
                warn!(response = %response, "Unexpected Redis health check response");
                Ok(false)
            }
            Err(e) => {
                error!(error = %e, "Redis health check failed");
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Execute a Redis operation, retrying transient failures with
    /// exponential backoff
    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(
            MultiplexedConnection,
        ) -> std::pin::Pin<Box<dyn std::future::Future<Output = RedisResult<T>> + Send>>,
    {
        let mut attempts = 0;
        let mut delay = self.config.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            match operation(conn).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.config.max_retries && is_retriable_error(&e) => {
                    warn!(
                        attempt = attempts,
                        max_retries = self.config.max_retries,
                        delay_ms = delay,
                        error = %e,
                        "Redis operation failed, retrying"
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Whether a Redis error is transient and worth retrying
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Mask credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let (Some(at_pos), Some(proto_end)) = (url.find('@'), url.find("://")) {
        if proto_end < at_pos {
            return format!("{}****{}", &url[..proto_end + 3], &url[at_pos..]);
        }
    }
    url.to_string()
}
