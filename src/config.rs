//! Runtime configuration for artifact-cache-tier.
//!
//! Configuration can be loaded from a JSON file or constructed programmatically.
//! All tier-related knobs (capacities, entry limits, TTLs, eviction policies)
//! live here, along with the maintenance scheduler intervals.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::error::CacheError;

/// Eviction policy for a tier: the scoring rule used to order entries when
/// capacity pressure forces removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Least-recently-accessed entries are evicted first.
    Recency,
    /// Least-frequently-accessed entries are evicted first.
    Frequency,
    /// Soonest-to-expire entries are evicted first; entries without a TTL last.
    Expiry,
    /// Lowest priority first, then least-accessed; `critical` entries are
    /// evicted only when nothing else remains.
    Priority,
}

impl std::fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvictionPolicy::Recency => write!(f, "recency"),
            EvictionPolicy::Frequency => write!(f, "frequency"),
            EvictionPolicy::Expiry => write!(f, "expiry"),
            EvictionPolicy::Priority => write!(f, "priority"),
        }
    }
}

/// Capacity and behavior configuration for a single cache tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierConfig {
    /// Maximum total bytes of live entries.
    pub max_size_bytes: u64,

    /// Maximum number of live entries. A tier with `max_entries = 0`
    /// rejects all writes.
    pub max_entries: usize,

    /// Default TTL applied to entries inserted without an override,
    /// in seconds. 0 means no default expiry.
    pub default_ttl_secs: u64,

    /// Eviction policy used under capacity pressure.
    pub eviction_policy: EvictionPolicy,

    /// Invoke the persistence hook after every successful write.
    pub persist_on_write: bool,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: 64 * 1024 * 1024, // 64 MB
            max_entries: 10_000,
            default_ttl_secs: 3600,
            eviction_policy: EvictionPolicy::Recency,
            persist_on_write: false,
        }
    }
}

impl TierConfig {
    /// Processed document text: large payloads, day-scale TTL, recency eviction.
    pub fn document() -> Self {
        Self {
            max_size_bytes: 256 * 1024 * 1024, // 256 MB
            max_entries: 5_000,
            default_ttl_secs: 24 * 3600,
            eviction_policy: EvictionPolicy::Recency,
            persist_on_write: false,
        }
    }

    /// Extracted entities: many small entries, week-scale TTL, frequency eviction.
    pub fn entity() -> Self {
        Self {
            max_size_bytes: 64 * 1024 * 1024, // 64 MB
            max_entries: 50_000,
            default_ttl_secs: 7 * 24 * 3600,
            eviction_policy: EvictionPolicy::Frequency,
            persist_on_write: false,
        }
    }

    /// Computed AI analysis results: medium payloads, half-day TTL.
    pub fn ai_result() -> Self {
        Self {
            max_size_bytes: 128 * 1024 * 1024, // 128 MB
            max_entries: 20_000,
            default_ttl_secs: 12 * 3600,
            eviction_policy: EvictionPolicy::Recency,
            persist_on_write: false,
        }
    }

    /// Loaded model payloads: large, never expire, priority eviction so
    /// `critical` models survive capacity pressure.
    pub fn model() -> Self {
        Self {
            max_size_bytes: 2 * 1024 * 1024 * 1024, // 2 GB
            max_entries: 16,
            default_ttl_secs: 0, // no expiry
            eviction_policy: EvictionPolicy::Priority,
            persist_on_write: false,
        }
    }

    /// The configured default TTL, or `None` when the tier has no default expiry.
    pub fn default_ttl(&self) -> Option<Duration> {
        if self.default_ttl_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.default_ttl_secs))
        }
    }
}

/// Maintenance scheduler intervals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    /// Seconds between expiry sweeps across all tiers.
    pub sweep_interval_secs: u64,

    /// Seconds between statistics snapshot passes (log-only, no removal).
    pub stats_interval_secs: u64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 60,
            stats_interval_secs: 300,
        }
    }
}

impl MaintenanceConfig {
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.sweep_interval_secs == 0 {
            return Err(CacheError::InvalidConfig(
                "sweep_interval_secs must be non-zero".to_string(),
            ));
        }
        if self.stats_interval_secs == 0 {
            return Err(CacheError::InvalidConfig(
                "stats_interval_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }
}

/// Top-level configuration: named tiers plus maintenance intervals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Tier configurations keyed by tier name.
    pub tiers: HashMap<String, TierConfig>,

    /// Background maintenance settings.
    pub maintenance: MaintenanceConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let mut tiers = HashMap::new();
        tiers.insert("document".to_string(), TierConfig::document());
        tiers.insert("entity".to_string(), TierConfig::entity());
        tiers.insert("ai_result".to_string(), TierConfig::ai_result());
        tiers.insert("model".to_string(), TierConfig::model());

        Self {
            tiers,
            maintenance: MaintenanceConfig::default(),
        }
    }
}

impl CacheConfig {
    /// Load configuration from a JSON file, falling back to defaults if the
    /// file does not exist.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(path)?;
            let config: CacheConfig = serde_json::from_str(&data)?;
            Ok(config)
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Ok(CacheConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_four_tiers() {
        let cfg = CacheConfig::default();
        assert_eq!(cfg.tiers.len(), 4);
        assert_eq!(cfg.tiers["model"].eviction_policy, EvictionPolicy::Priority);
        assert_eq!(cfg.tiers["model"].default_ttl(), None);
    }

    #[test]
    fn test_default_ttl_zero_means_none() {
        let mut cfg = TierConfig::default();
        cfg.default_ttl_secs = 0;
        assert_eq!(cfg.default_ttl(), None);

        cfg.default_ttl_secs = 90;
        assert_eq!(cfg.default_ttl(), Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_maintenance_validation_rejects_zero_interval() {
        let cfg = MaintenanceConfig {
            sweep_interval_secs: 0,
            stats_interval_secs: 300,
        };
        assert!(cfg.validate().is_err());
        assert!(MaintenanceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let cfg = CacheConfig::load(std::path::Path::new("/nonexistent/cache.json")).unwrap();
        assert_eq!(cfg.tiers.len(), 4);
        assert_eq!(cfg.maintenance.sweep_interval_secs, 60);
    }

    #[test]
    fn test_policy_roundtrips_through_json() {
        let json = serde_json::to_string(&EvictionPolicy::Frequency).unwrap();
        assert_eq!(json, "\"frequency\"");
        let back: EvictionPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, EvictionPolicy::Frequency);
    }
}
