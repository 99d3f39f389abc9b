//! In-process token store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::{TokenId, TokenRecord};
use crate::errors::StoreError;
use crate::services::token::{Clock, SystemClock};

use super::columns::{self, TokenColumns, FIELD_ACCESSED};
use super::r#trait::TokenStore;

struct Entry {
    columns: TokenColumns,
    expires_at: i64,
}

impl Entry {
    fn is_live(&self, now: i64) -> bool {
        now < self.expires_at
    }
}

/// Token store held in memory
///
/// Records are kept as the same flat field map a remote store would hold and
/// expire according to the injected clock. Expired entries are dropped on the
/// next write.
pub struct MemoryTokenStore<C: Clock = SystemClock> {
    entries: Arc<RwLock<HashMap<Uuid, Entry>>>,
    clock: C,
}

impl MemoryTokenStore<SystemClock> {
    /// Create a new store on the system clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryTokenStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryTokenStore<C> {
    /// Create a new store whose TTLs follow `clock`
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Number of live records
    pub async fn len(&self) -> usize {
        let now = self.clock.now_millis();
        let entries = self.entries.read().await;
        entries.values().filter(|entry| entry.is_live(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Raw stored fields for a live record
    pub async fn columns(&self, id: &TokenId) -> Option<TokenColumns> {
        let now = self.clock.now_millis();
        let entries = self.entries.read().await;
        entries
            .get(id.as_uuid())
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.columns.clone())
    }

    fn expiry(&self, ttl_seconds: u64) -> i64 {
        let ttl_millis = i64::try_from(ttl_seconds)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000);
        self.clock.now_millis().saturating_add(ttl_millis)
    }
}

#[async_trait]
impl<C: Clock> TokenStore for MemoryTokenStore<C> {
    async fn put(
        &self,
        id: &TokenId,
        record: &TokenRecord,
        ttl_seconds: u64,
    ) -> Result<(), StoreError> {
        let columns = columns::to_columns(record)?;
        let now = self.clock.now_millis();
        let expires_at = self.expiry(ttl_seconds);

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(*id.as_uuid(), Entry { columns, expires_at });
        Ok(())
    }

    async fn get(&self, id: &TokenId) -> Result<Option<TokenRecord>, StoreError> {
        let now = self.clock.now_millis();
        let entries = self.entries.read().await;
        match entries.get(id.as_uuid()) {
            Some(entry) if entry.is_live(now) => columns::from_columns(&entry.columns),
            _ => Ok(None),
        }
    }

    async fn set_accessed(
        &self,
        id: &TokenId,
        accessed: i64,
        ttl_seconds: u64,
    ) -> Result<bool, StoreError> {
        let now = self.clock.now_millis();
        let expires_at = self.expiry(ttl_seconds);

        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get_mut(id.as_uuid()).filter(|entry| entry.is_live(now)) else {
            return Ok(false);
        };

        let stored = entry
            .columns
            .get(FIELD_ACCESSED)
            .and_then(|value| value.parse::<i64>().ok());
        let accessed = stored.map_or(accessed, |stored| stored.max(accessed));
        entry
            .columns
            .insert(FIELD_ACCESSED.to_string(), accessed.to_string());
        entry.expires_at = expires_at;
        Ok(true)
    }
}
