//! Cache module for Redis-backed token persistence
//!
//! Provides the Redis client with retry logic and the token store built on it.

pub mod redis_client;
pub mod token_store;

#[cfg(test)]
mod tests;

pub use redis_client::RedisClient;
pub use token_store::RedisTokenStore;

// Re-export commonly used types
pub use tk_shared::config::CacheConfig;
