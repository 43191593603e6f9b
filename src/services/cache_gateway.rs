use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::{
    constants::{METADATA_CACHE_KEY, WALLET_CACHE_INDEX_KEY, WALLET_CACHE_PREFIX},
    error::{AppError, Result},
    models::{CacheEntry, CacheStats},
};

/// Backend for the two cache namespaces: wallet data keyed by
/// `(wallet id, data type)` and coin metadata keyed by coin type.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get_wallet_data(&self, wallet_id: &str, data_type: &str)
        -> Result<Option<CacheEntry>>;
    async fn set_wallet_data(
        &self,
        wallet_id: &str,
        data_type: &str,
        entry: &CacheEntry,
    ) -> Result<()>;
    /// Removes one data type, or every entry of the wallet when `data_type` is `None`.
    async fn delete_wallet_data(&self, wallet_id: &str, data_type: Option<&str>) -> Result<u64>;
    async fn get_metadata(&self, coin_type: &str) -> Result<Option<CacheEntry>>;
    async fn set_metadata(&self, entries: &[(String, CacheEntry)]) -> Result<()>;
    async fn count_entries(&self) -> Result<u64>;
    async fn ping(&self) -> Result<()>;
}

fn wallet_key(wallet_id: &str) -> String {
    format!("{}:{}", WALLET_CACHE_PREFIX, wallet_id)
}

fn decode_entry(raw: Option<String>) -> Result<Option<CacheEntry>> {
    match raw {
        Some(raw) => Ok(Some(serde_json::from_str(&raw).map_err(|e| {
            AppError::Internal(format!("Corrupt cache entry: {}", e))
        })?)),
        None => Ok(None),
    }
}

fn encode_entry(entry: &CacheEntry) -> Result<String> {
    serde_json::to_string(entry)
        .map_err(|e| AppError::Internal(format!("Cache encode failed: {}", e)))
}

/// Redis-backed store. The connection manager is created on the first call
/// and shared afterwards; it reconnects on its own after drops.
pub struct RedisCacheStore {
    redis_url: String,
    manager: OnceCell<ConnectionManager>,
}

impl RedisCacheStore {
    pub fn new(redis_url: impl Into<String>) -> Self {
        Self {
            redis_url: redis_url.into(),
            manager: OnceCell::new(),
        }
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        let manager = self
            .manager
            .get_or_try_init(|| async {
                let client = redis::Client::open(self.redis_url.as_str())?;
                let manager = ConnectionManager::new(client).await?;
                tracing::info!("Redis cache connection established");
                Ok::<_, redis::RedisError>(manager)
            })
            .await?;
        Ok(manager.clone())
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get_wallet_data(
        &self,
        wallet_id: &str,
        data_type: &str,
    ) -> Result<Option<CacheEntry>> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.hget(wallet_key(wallet_id), data_type).await?;
        decode_entry(raw)
    }

    async fn set_wallet_data(
        &self,
        wallet_id: &str,
        data_type: &str,
        entry: &CacheEntry,
    ) -> Result<()> {
        let mut conn = self.connection().await?;
        let payload = encode_entry(entry)?;
        let _: () = conn.hset(wallet_key(wallet_id), data_type, payload).await?;
        let _: () = conn.sadd(WALLET_CACHE_INDEX_KEY, wallet_id).await?;
        Ok(())
    }

    async fn delete_wallet_data(&self, wallet_id: &str, data_type: Option<&str>) -> Result<u64> {
        let mut conn = self.connection().await?;
        let key = wallet_key(wallet_id);
        match data_type {
            Some(data_type) => {
                let removed: u64 = conn.hdel(&key, data_type).await?;
                let remaining: u64 = conn.hlen(&key).await?;
                if remaining == 0 {
                    let _: () = conn.srem(WALLET_CACHE_INDEX_KEY, wallet_id).await?;
                }
                Ok(removed)
            }
            None => {
                let removed: u64 = conn.hlen(&key).await?;
                let _: () = conn.del(&key).await?;
                let _: () = conn.srem(WALLET_CACHE_INDEX_KEY, wallet_id).await?;
                Ok(removed)
            }
        }
    }

    async fn get_metadata(&self, coin_type: &str) -> Result<Option<CacheEntry>> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.hget(METADATA_CACHE_KEY, coin_type).await?;
        decode_entry(raw)
    }

    async fn set_metadata(&self, entries: &[(String, CacheEntry)]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        let mut fields = Vec::with_capacity(entries.len());
        for (coin_type, entry) in entries {
            fields.push((coin_type.as_str(), encode_entry(entry)?));
        }
        let _: () = conn.hset_multiple(METADATA_CACHE_KEY, &fields).await?;
        Ok(())
    }

    async fn count_entries(&self) -> Result<u64> {
        let mut conn = self.connection().await?;
        let wallet_ids: Vec<String> = conn.smembers(WALLET_CACHE_INDEX_KEY).await?;
        let mut total: u64 = conn.hlen(METADATA_CACHE_KEY).await?;
        for wallet_id in wallet_ids {
            let count: u64 = conn.hlen(wallet_key(&wallet_id)).await?;
            total += count;
        }
        Ok(total)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Cache Gateway - read-through / write-through front for the cache store
///
/// The gateway never fails a request: backend errors turn reads into misses
/// and writes into no-ops, with a warning logged for each.
#[derive(Clone)]
pub struct CacheGateway {
    store: Arc<dyn CacheStore>,
}

impl CacheGateway {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Cached blob or `None`; a miss never triggers an upstream fetch.
    pub async fn get_wallet_data(&self, wallet_id: &str, data_type: &str) -> Option<CacheEntry> {
        match self.store.get_wallet_data(wallet_id, data_type).await {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(
                    "Cache read degraded to miss wallet={} type={} err={}",
                    wallet_id,
                    data_type,
                    err
                );
                None
            }
        }
    }

    /// Upserts with `last_fetched = now`. Returns whether the write landed.
    pub async fn set_wallet_data(
        &self,
        wallet_id: &str,
        data_type: &str,
        data: serde_json::Value,
    ) -> bool {
        let entry = CacheEntry::fresh(data);
        match self.store.set_wallet_data(wallet_id, data_type, &entry).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    "Cache write dropped wallet={} type={} err={}",
                    wallet_id,
                    data_type,
                    err
                );
                false
            }
        }
    }

    pub async fn invalidate_wallet_data(&self, wallet_id: &str, data_type: Option<&str>) -> u64 {
        match self.store.delete_wallet_data(wallet_id, data_type).await {
            Ok(removed) => removed,
            Err(err) => {
                tracing::warn!(
                    "Cache invalidation dropped wallet={} type={:?} err={}",
                    wallet_id,
                    data_type,
                    err
                );
                0
            }
        }
    }

    pub async fn get_metadata(&self, coin_type: &str) -> Option<CacheEntry> {
        match self.store.get_metadata(coin_type).await {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("Metadata read degraded to miss coin={} err={}", coin_type, err);
                None
            }
        }
    }

    pub async fn set_metadata(&self, coin_type: &str, data: serde_json::Value) -> bool {
        let entries = [(coin_type.to_string(), CacheEntry::fresh(data))];
        match self.store.set_metadata(&entries).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("Metadata write dropped coin={} err={}", coin_type, err);
                false
            }
        }
    }

    /// Upserts each entry; returns how many were written (0 when the backend is down).
    pub async fn set_batch_metadata(&self, batch: HashMap<String, serde_json::Value>) -> usize {
        let entries: Vec<(String, CacheEntry)> = batch
            .into_iter()
            .map(|(coin_type, data)| (coin_type, CacheEntry::fresh(data)))
            .collect();
        match self.store.set_metadata(&entries).await {
            Ok(()) => entries.len(),
            Err(err) => {
                tracing::warn!(
                    "Metadata batch write dropped entries={} err={}",
                    entries.len(),
                    err
                );
                0
            }
        }
    }

    pub async fn stats(&self) -> CacheStats {
        let total = match self.store.count_entries().await {
            Ok(total) => total,
            Err(err) => {
                tracing::warn!("Cache stats unavailable: {}", err);
                0
            }
        };
        CacheStats::with_entries(total)
    }

    pub async fn is_healthy(&self) -> bool {
        self.store.ping().await.is_ok()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use tokio::sync::RwLock;

    #[derive(Default)]
    pub struct MemoryCacheStore {
        wallets: RwLock<HashMap<String, HashMap<String, CacheEntry>>>,
        metadata: RwLock<HashMap<String, CacheEntry>>,
    }

    #[async_trait]
    impl CacheStore for MemoryCacheStore {
        async fn get_wallet_data(
            &self,
            wallet_id: &str,
            data_type: &str,
        ) -> Result<Option<CacheEntry>> {
            Ok(self
                .wallets
                .read()
                .await
                .get(wallet_id)
                .and_then(|fields| fields.get(data_type))
                .cloned())
        }

        async fn set_wallet_data(
            &self,
            wallet_id: &str,
            data_type: &str,
            entry: &CacheEntry,
        ) -> Result<()> {
            self.wallets
                .write()
                .await
                .entry(wallet_id.to_string())
                .or_default()
                .insert(data_type.to_string(), entry.clone());
            Ok(())
        }

        async fn delete_wallet_data(
            &self,
            wallet_id: &str,
            data_type: Option<&str>,
        ) -> Result<u64> {
            let mut wallets = self.wallets.write().await;
            let removed = match data_type {
                Some(data_type) => wallets
                    .get_mut(wallet_id)
                    .and_then(|fields| fields.remove(data_type))
                    .map_or(0, |_| 1),
                None => wallets
                    .remove(wallet_id)
                    .map_or(0, |fields| fields.len() as u64),
            };
            wallets.retain(|_, fields| !fields.is_empty());
            Ok(removed)
        }

        async fn get_metadata(&self, coin_type: &str) -> Result<Option<CacheEntry>> {
            Ok(self.metadata.read().await.get(coin_type).cloned())
        }

        async fn set_metadata(&self, entries: &[(String, CacheEntry)]) -> Result<()> {
            let mut metadata = self.metadata.write().await;
            for (coin_type, entry) in entries {
                metadata.insert(coin_type.clone(), entry.clone());
            }
            Ok(())
        }

        async fn count_entries(&self) -> Result<u64> {
            let wallets: usize = self.wallets.read().await.values().map(HashMap::len).sum();
            Ok((wallets + self.metadata.read().await.len()) as u64)
        }

        async fn ping(&self) -> Result<()> {
            Ok(())
        }
    }

    pub struct UnavailableStore;

    fn unavailable<T>() -> Result<T> {
        Err(AppError::Internal("cache backend unreachable".to_string()))
    }

    #[async_trait]
    impl CacheStore for UnavailableStore {
        async fn get_wallet_data(&self, _: &str, _: &str) -> Result<Option<CacheEntry>> {
            unavailable()
        }
        async fn set_wallet_data(&self, _: &str, _: &str, _: &CacheEntry) -> Result<()> {
            unavailable()
        }
        async fn delete_wallet_data(&self, _: &str, _: Option<&str>) -> Result<u64> {
            unavailable()
        }
        async fn get_metadata(&self, _: &str) -> Result<Option<CacheEntry>> {
            unavailable()
        }
        async fn set_metadata(&self, _: &[(String, CacheEntry)]) -> Result<()> {
            unavailable()
        }
        async fn count_entries(&self) -> Result<u64> {
            unavailable()
        }
        async fn ping(&self) -> Result<()> {
            unavailable()
        }
    }
}
