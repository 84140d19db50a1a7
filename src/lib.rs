//! artifact-cache-tier: multi-tier cache for derived NLP artifacts.
//!
//! Stores size- and time-bounded collections of derived artifacts (processed
//! documents, extracted entities, computed AI results, loaded model payloads)
//! in independently configured named tiers. Each tier enforces byte and
//! entry-count limits through one of four eviction policies (recency,
//! frequency, expiry, priority), tracks hit/miss/latency statistics, and is
//! swept for expired entries by a background maintenance task.
//!
//! ```no_run
//! use artifact_cache_tier::{CacheConfig, CacheManager, PutOptions};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let cache: CacheManager<String> = CacheManager::new(CacheConfig::default())?;
//!
//! cache
//!     .put("document", "contract-42", "extracted text".to_string(), PutOptions::default())
//!     .await?;
//! let text = cache.get("document", "contract-42").await?;
//! assert!(text.is_some());
//!
//! cache.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;

pub use cache::entry::{CacheEntry, Priority, PutOptions};
pub use cache::error::CacheError;
pub use cache::manager::{generate_key, CacheManager, PersistenceHook};
pub use cache::size::EstimateSize;
pub use cache::stats::TierStatistics;
pub use config::{CacheConfig, EvictionPolicy, MaintenanceConfig, TierConfig};
