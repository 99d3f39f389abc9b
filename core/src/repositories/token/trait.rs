//! Token store trait defining the interface for token record persistence.

use async_trait::async_trait;

use crate::domain::entities::token::{TokenId, TokenRecord};
use crate::errors::StoreError;

/// Key-value store for token records with per-record expiry
///
/// Records are keyed by token id and expire `ttl_seconds` after their last
/// write. There is no delete operation; records disappear when their TTL runs
/// out.
///
/// Implementations own retries and timeouts. Any failure reaching the caller is
/// reported as `StoreError` and is never mistaken for a missing record.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Insert or replace a record and reset its TTL
    ///
    /// # Arguments
    /// * `id` - Token id the record is keyed by
    /// * `record` - Record to persist
    /// * `ttl_seconds` - Store retention for the record
    ///
    /// # Returns
    /// * `Ok(())` - Record persisted
    /// * `Err(StoreError)` - Write failed
    async fn put(
        &self,
        id: &TokenId,
        record: &TokenRecord,
        ttl_seconds: u64,
    ) -> Result<(), StoreError>;

    /// Fetch a record by token id
    ///
    /// # Returns
    /// * `Ok(Some(TokenRecord))` - Record found
    /// * `Ok(None)` - No record, or it expired, or a required field is missing
    /// * `Err(StoreError)` - Read failed or the record is corrupt
    async fn get(&self, id: &TokenId) -> Result<Option<TokenRecord>, StoreError>;

    /// Update the `accessed` field of an existing record and reset its TTL
    ///
    /// The stored value never moves backwards: the larger of `accessed` and the
    /// current field is kept. Nothing is written if the record no longer
    /// exists.
    ///
    /// # Returns
    /// * `Ok(true)` - Record exists and was updated
    /// * `Ok(false)` - No record for `id`
    /// * `Err(StoreError)` - Write failed
    async fn set_accessed(
        &self,
        id: &TokenId,
        accessed: i64,
        ttl_seconds: u64,
    ) -> Result<bool, StoreError>;
}
