//! The cache manager: the public façade over all tiers.
//!
//! The manager owns a registry of named tiers, each behind its own lock so
//! operations on different tiers never contend. It also owns the maintenance
//! scheduler's lifecycle and the optional persistence hook, which is always
//! invoked outside a tier's critical section so a slow or failing backend
//! never blocks cache availability.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

use crate::cache::entry::{CacheEntry, PutOptions};
use crate::cache::error::CacheError;
use crate::cache::maintenance::{self, MaintenanceHandle};
use crate::cache::size::EstimateSize;
use crate::cache::stats::TierStatistics;
use crate::cache::tier::TierStore;
use crate::config::{CacheConfig, TierConfig};

/// Shared registry of named tiers. Read-mostly: the outer lock is only
/// written by `configure_tier`.
pub(crate) type TierMap<V> = Arc<RwLock<HashMap<String, Arc<RwLock<TierStore<V>>>>>>;

/// Optional storage backend behind the cache.
///
/// The cache calls `persist` after a successful write when the tier has
/// `persist_on_write` set, and falls back to `load` on a local miss before
/// reporting the miss to the caller. Failures are logged, never propagated
/// into the in-memory operation.
#[async_trait]
pub trait PersistenceHook<V>: Send + Sync {
    async fn persist(&self, tier: &str, key: &str, entry: &CacheEntry<V>) -> anyhow::Result<()>;

    async fn load(&self, tier: &str, key: &str) -> anyhow::Result<Option<(V, PutOptions)>>;
}

/// Deterministic composite key: colon-joined parts.
///
/// Pure function so every caller builds keys the same way.
pub fn generate_key(parts: &[&str]) -> String {
    parts.join(":")
}

/// Owns the tier stores, their statistics, and the maintenance task.
///
/// Construct once at application startup (inside a tokio runtime) and hand
/// to consumers; call [`CacheManager::shutdown`] before process exit to stop
/// the maintenance task cleanly.
pub struct CacheManager<V> {
    tiers: TierMap<V>,
    persistence: Option<Arc<dyn PersistenceHook<V>>>,
    maintenance: Mutex<Option<MaintenanceHandle>>,
}

impl<V> CacheManager<V>
where
    V: EstimateSize + Send + Sync + 'static,
{
    /// Create a manager with the given tiers and start the maintenance task.
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        Self::build(config, None)
    }

    /// Create a manager backed by a persistence hook.
    pub fn with_persistence(
        config: CacheConfig,
        hook: Arc<dyn PersistenceHook<V>>,
    ) -> Result<Self, CacheError> {
        Self::build(config, Some(hook))
    }

    fn build(
        config: CacheConfig,
        persistence: Option<Arc<dyn PersistenceHook<V>>>,
    ) -> Result<Self, CacheError> {
        config.maintenance.validate()?;

        let mut map = HashMap::new();
        for (name, tier_config) in config.tiers {
            if name.trim().is_empty() {
                return Err(CacheError::InvalidConfig(
                    "tier name must be non-empty".to_string(),
                ));
            }
            map.insert(
                name.clone(),
                Arc::new(RwLock::new(TierStore::new(name, tier_config))),
            );
        }

        let tiers: TierMap<V> = Arc::new(RwLock::new(map));
        let handle = maintenance::spawn(tiers.clone(), config.maintenance);

        Ok(Self {
            tiers,
            persistence,
            maintenance: Mutex::new(Some(handle)),
        })
    }

    /// Register a new tier, or apply new limits to an existing one.
    ///
    /// Reconfiguring takes effect immediately and may evict if the new
    /// limits are smaller than current usage.
    pub async fn configure_tier(&self, name: &str, config: TierConfig) -> Result<(), CacheError> {
        if name.trim().is_empty() {
            return Err(CacheError::InvalidConfig(
                "tier name must be non-empty".to_string(),
            ));
        }

        let mut registry = self.tiers.write().await;
        match registry.get(name) {
            Some(store) => store.write().await.reconfigure(config),
            None => {
                registry.insert(
                    name.to_string(),
                    Arc::new(RwLock::new(TierStore::new(name, config))),
                );
            }
        }
        Ok(())
    }

    /// Insert or replace an entry in the named tier.
    pub async fn put(
        &self,
        tier: &str,
        key: &str,
        value: V,
        options: PutOptions,
    ) -> Result<(), CacheError> {
        let store = self.tier(tier).await?;
        let value = Arc::new(value);

        // In-memory write first; the hook runs after the lock is released.
        let persist_entry = {
            let mut guard = store.write().await;
            guard.put(key, value, &options)?;
            if guard.config().persist_on_write && self.persistence.is_some() {
                guard.peek(key).cloned()
            } else {
                None
            }
        };

        if let (Some(hook), Some(entry)) = (&self.persistence, persist_entry) {
            if let Err(err) = hook.persist(tier, key, &entry).await {
                warn!(tier, key, error = %err, "Persistence hook failed; in-memory write retained");
            }
        }

        Ok(())
    }

    /// Look up an entry, falling back to the persistence hook on a local miss.
    pub async fn get(&self, tier: &str, key: &str) -> Result<Option<Arc<V>>, CacheError> {
        let store = self.tier(tier).await?;

        if let Some(value) = store.write().await.get(key) {
            return Ok(Some(value));
        }

        if let Some(hook) = &self.persistence {
            match hook.load(tier, key).await {
                Ok(Some((value, options))) => {
                    let value = Arc::new(value);
                    if let Err(err) = store.write().await.put(key, Arc::clone(&value), &options) {
                        warn!(tier, key, error = %err, "Loaded entry not re-admitted");
                    }
                    return Ok(Some(value));
                }
                Ok(None) => {}
                Err(err) => warn!(tier, key, error = %err, "Persistence load failed"),
            }
        }

        Ok(None)
    }

    /// Unconditional removal. Returns whether an entry existed.
    pub async fn evict(&self, tier: &str, key: &str) -> Result<bool, CacheError> {
        let store = self.tier(tier).await?;
        let removed = store.write().await.evict(key);
        Ok(removed)
    }

    /// Remove all entries from one tier, or from every tier when `tier` is
    /// `None` or empty. Returns the total count removed.
    pub async fn clear(&self, tier: Option<&str>) -> Result<usize, CacheError> {
        match tier {
            Some(name) if !name.is_empty() => {
                let store = self.tier(name).await?;
                let removed = store.write().await.clear();
                Ok(removed)
            }
            _ => {
                let snapshot = self.tier_snapshot().await;
                let mut total = 0;
                for (_, store) in snapshot {
                    total += store.write().await.clear();
                }
                Ok(total)
            }
        }
    }

    /// Keys of live entries in the named tier carrying the given tag.
    ///
    /// Tags are informational only; this does not count as an access.
    pub async fn keys_with_tag(&self, tier: &str, tag: &str) -> Result<Vec<String>, CacheError> {
        let store = self.tier(tier).await?;
        let keys = store.read().await.keys_with_tag(tag);
        Ok(keys)
    }

    /// Read-only statistics snapshot for one tier.
    pub async fn statistics(&self, tier: &str) -> Result<TierStatistics, CacheError> {
        let store = self.tier(tier).await?;
        let snapshot = store.read().await.statistics();
        Ok(snapshot)
    }

    /// Statistics snapshots for every configured tier.
    pub async fn all_statistics(&self) -> HashMap<String, TierStatistics> {
        let snapshot = self.tier_snapshot().await;
        let mut out = HashMap::new();
        for (name, store) in snapshot {
            out.insert(name, store.read().await.statistics());
        }
        out
    }

    /// Stop the maintenance task cleanly. Idempotent.
    pub async fn shutdown(&self) {
        let handle = self.maintenance.lock().await.take();
        if let Some(handle) = handle {
            handle.shutdown().await;
        }
    }

    async fn tier(&self, name: &str) -> Result<Arc<RwLock<TierStore<V>>>, CacheError> {
        let registry = self.tiers.read().await;
        registry
            .get(name)
            .cloned()
            .ok_or_else(|| CacheError::UnknownTier(name.to_string()))
    }

    async fn tier_snapshot(&self) -> Vec<(String, Arc<RwLock<TierStore<V>>>)> {
        let registry = self.tiers.read().await;
        registry
            .iter()
            .map(|(name, store)| (name.clone(), store.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_key_is_deterministic() {
        assert_eq!(generate_key(&["document", "contract-42", "v1"]), "document:contract-42:v1");
        assert_eq!(generate_key(&["solo"]), "solo");
        assert_eq!(generate_key(&[]), "");
    }

    #[tokio::test]
    async fn test_unknown_tier_is_an_error() {
        let manager: CacheManager<String> = CacheManager::new(CacheConfig::default()).unwrap();

        let err = manager.get("nonexistent", "k").await.unwrap_err();
        assert!(matches!(err, CacheError::UnknownTier(_)));

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_tier_name_rejected() {
        let manager: CacheManager<String> = CacheManager::new(CacheConfig::default()).unwrap();

        let err = manager
            .configure_tier("  ", TierConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::InvalidConfig(_)));

        manager.shutdown().await;
    }
}
