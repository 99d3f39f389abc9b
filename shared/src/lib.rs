//! Shared configuration types for TokenKeep
//!
//! Everything here is plain data that can be built from defaults, loaded from
//! environment variables or deserialized with serde.

pub mod config;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, Environment, LogFormat, LoggingConfig, TokenConfig,
};
