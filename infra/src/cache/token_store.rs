//! Redis-backed token store
//!
//! Each record is one hash at `{prefix}:token:{uuid}` holding the persisted
//! token fields. The hash TTL is the record's retention.

use async_trait::async_trait;
use redis::Script;
use tk_core::domain::entities::token::{TokenId, TokenRecord};
use tk_core::errors::StoreError;
use tk_core::repositories::token::columns::{self, FIELD_ACCESSED};
use tk_core::repositories::TokenStore;
use tracing::debug;

use super::redis_client::RedisClient;
use crate::InfrastructureError;

/// Raises the access field and resets the expiry of a hash that still exists
///
/// The stored value is kept when it is already later than the new one.
const SET_ACCESSED_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return 0
end
local accessed = ARGV[2]
local stored = redis.call('HGET', KEYS[1], ARGV[1])
if stored and tonumber(stored) and tonumber(stored) > tonumber(accessed) then
    accessed = stored
end
redis.call('HSET', KEYS[1], ARGV[1], accessed)
redis.call('EXPIRE', KEYS[1], ARGV[3])
return 1
"#;

/// Token store keeping one Redis hash per token
#[derive(Clone)]
pub struct RedisTokenStore {
    client: RedisClient,
    set_accessed_script: Script,
}

impl RedisTokenStore {
    pub fn new(client: RedisClient) -> Self {
        Self {
            client,
            set_accessed_script: Script::new(SET_ACCESSED_SCRIPT),
        }
    }

    /// Redis key of the record for `id`
    pub fn key_for(&self, id: &TokenId) -> String {
        self.client.make_key(&format!("token:{}", id))
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn put(
        &self,
        id: &TokenId,
        record: &TokenRecord,
        ttl_seconds: u64,
    ) -> Result<(), StoreError> {
        let fields: Vec<(String, String)> = columns::to_columns(record)?.into_iter().collect();
        let key = self.key_for(id);

        self.client
            .hset_with_expiry(&key, &fields, ttl_seconds)
            .await?;
        debug!(token_id = %id, ttl_seconds, "Token record stored");
        Ok(())
    }

    async fn get(&self, id: &TokenId) -> Result<Option<TokenRecord>, StoreError> {
        let fields = self.client.hgetall(&self.key_for(id)).await?;
        if fields.is_empty() {
            return Ok(None);
        }
        columns::from_columns(&fields)
    }

    async fn set_accessed(
        &self,
        id: &TokenId,
        accessed: i64,
        ttl_seconds: u64,
    ) -> Result<bool, StoreError> {
        let updated = self
            .client
            .eval_on_key(
                &self.set_accessed_script,
                &self.key_for(id),
                &[
                    FIELD_ACCESSED.to_string(),
                    accessed.to_string(),
                    ttl_seconds.to_string(),
                ],
            )
            .await?;

        if updated == 0 {
            debug!(token_id = %id, "Token record gone before access update");
        }
        Ok(updated == 1)
    }
}

impl From<InfrastructureError> for StoreError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Cache(e) if e.kind() == redis::ErrorKind::TypeError => {
                StoreError::corrupt("*", e.to_string())
            }
            other => StoreError::Unavailable {
                message: other.to_string(),
            },
        }
    }
}
