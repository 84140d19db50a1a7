//! A single named cache tier.
//!
//! A tier owns a bounded key→entry map and keeps `current_size_bytes` in sync
//! incrementally with every insert and removal. Capacity pressure is resolved
//! before an insert lands: victims are removed in the tier's policy order
//! until the incoming entry fits. Expiry is enforced both lazily on `get`
//! and by the maintenance scheduler's sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::cache::entry::{normalize_tags, CacheEntry, PutOptions};
use crate::cache::error::CacheError;
use crate::cache::evictor::eviction_order;
use crate::cache::size::EstimateSize;
use crate::cache::stats::{StatisticsTracker, TierStatistics};
use crate::config::TierConfig;

pub struct TierStore<V> {
    name: String,
    config: TierConfig,
    entries: HashMap<String, CacheEntry<V>>,
    /// Invariant: always equals the sum of live entries' sizes.
    current_size_bytes: u64,
    /// Monotonic insertion counter, the eviction tie-break.
    next_seq: u64,
    /// Reference instant for integer eviction scores.
    epoch: Instant,
    stats: StatisticsTracker,
}

impl<V: EstimateSize> TierStore<V> {
    pub fn new(name: impl Into<String>, config: TierConfig) -> Self {
        Self {
            name: name.into(),
            config,
            entries: HashMap::new(),
            current_size_bytes: 0,
            next_seq: 0,
            epoch: Instant::now(),
            stats: StatisticsTracker::default(),
        }
    }

    /// Insert or replace an entry.
    ///
    /// Replacing an existing key is admitted on the size delta: the old entry
    /// is dropped from the accounting first, so a shrinking update never
    /// triggers eviction. The replacement gets fresh metadata (an update
    /// replaces the entry wholesale).
    pub fn put(&mut self, key: &str, value: Arc<V>, options: &PutOptions) -> Result<(), CacheError> {
        let size = value.estimate_bytes() as u64;

        if size > self.config.max_size_bytes || self.config.max_entries == 0 {
            return Err(CacheError::CapacityExceeded {
                tier: self.name.clone(),
                requested: size,
                max_size_bytes: self.config.max_size_bytes,
                max_entries: self.config.max_entries,
            });
        }

        if let Some(old) = self.entries.remove(key) {
            self.current_size_bytes = self.current_size_bytes.saturating_sub(old.size_bytes());
        }

        self.make_headroom(size);

        let ttl = options.ttl.or_else(|| self.config.default_ttl());
        let priority = options.priority.unwrap_or_default();
        let tags = normalize_tags(&options.tags);

        let seq = self.next_seq;
        self.next_seq += 1;

        let entry = CacheEntry::new(key.to_string(), value, size, ttl, priority, tags, seq);
        self.current_size_bytes += size;
        self.entries.insert(key.to_string(), entry);

        Ok(())
    }

    /// Look up an entry, enforcing TTL lazily.
    ///
    /// An expired entry is removed and reported as a miss, so callers never
    /// observe stale data between maintenance sweeps.
    pub fn get(&mut self, key: &str) -> Option<Arc<V>> {
        let start = Instant::now();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(start),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            if let Some(entry) = self.entries.remove(key) {
                self.current_size_bytes =
                    self.current_size_bytes.saturating_sub(entry.size_bytes());
                debug!(tier = %self.name, key, "Entry expired on read");
            }
            self.stats.record_miss();
            return None;
        }

        let value = self.entries.get_mut(key).map(|entry| {
            entry.touch();
            entry.value()
        });

        if value.is_some() {
            self.stats.record_hit();
            self.stats.record_access_time(start.elapsed());
        }
        value
    }

    /// Unconditional removal. Returns whether an entry existed.
    pub fn evict(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.current_size_bytes =
                    self.current_size_bytes.saturating_sub(entry.size_bytes());
                self.stats.record_eviction();
                true
            }
            None => false,
        }
    }

    /// Remove all entries, returning the count removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.current_size_bytes = 0;
        removed
    }

    /// Remove every entry whose TTL has elapsed as of `now`.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<String> = self
            .entries
            .values()
            .filter(|entry| entry.is_expired(now))
            .map(|entry| entry.key().to_string())
            .collect();

        for key in &expired {
            if let Some(entry) = self.entries.remove(key) {
                self.current_size_bytes =
                    self.current_size_bytes.saturating_sub(entry.size_bytes());
                self.stats.record_eviction();
            }
        }

        expired.len()
    }

    /// Apply new limits immediately, evicting in policy order if current
    /// usage no longer fits.
    pub fn reconfigure(&mut self, config: TierConfig) {
        self.config = config;

        if self.within_limits() {
            return;
        }

        let order = eviction_order(
            self.entries.values(),
            self.config.eviction_policy,
            self.epoch,
        );
        for victim in order {
            if self.within_limits() {
                break;
            }
            if let Some(entry) = self.entries.remove(&victim.key) {
                self.current_size_bytes =
                    self.current_size_bytes.saturating_sub(entry.size_bytes());
                self.stats.record_eviction();
                debug!(tier = %self.name, key = %victim.key, "Evicted entry on reconfigure");
            }
        }
    }

    /// Snapshot of counters plus live usage.
    pub fn statistics(&self) -> TierStatistics {
        self.stats
            .snapshot(self.entries.len(), self.current_size_bytes)
    }

    /// Read an entry without counting an access (for persistence).
    pub fn peek(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    /// Keys of live entries carrying the given tag.
    pub fn keys_with_tag(&self, tag: &str) -> Vec<String> {
        self.entries
            .values()
            .filter(|entry| entry.tags().contains(tag))
            .map(|entry| entry.key().to_string())
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &TierConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_size_bytes(&self) -> u64 {
        self.current_size_bytes
    }

    fn within_limits(&self) -> bool {
        self.current_size_bytes <= self.config.max_size_bytes
            && self.entries.len() <= self.config.max_entries
    }

    /// Evict in policy order until `incoming_bytes` and one slot fit.
    ///
    /// Bounded by the current entry count; the tier may end up empty.
    fn make_headroom(&mut self, incoming_bytes: u64) {
        if !self.needs_headroom(incoming_bytes) {
            return;
        }

        let order = eviction_order(
            self.entries.values(),
            self.config.eviction_policy,
            self.epoch,
        );
        for victim in order {
            if !self.needs_headroom(incoming_bytes) {
                break;
            }
            if let Some(entry) = self.entries.remove(&victim.key) {
                self.current_size_bytes =
                    self.current_size_bytes.saturating_sub(entry.size_bytes());
                self.stats.record_eviction();
                debug!(
                    tier = %self.name,
                    key = %victim.key,
                    size = entry.size_bytes(),
                    "Evicted entry for headroom"
                );
            }
        }
    }

    fn needs_headroom(&self, incoming_bytes: u64) -> bool {
        self.current_size_bytes + incoming_bytes > self.config.max_size_bytes
            || self.entries.len() >= self.config.max_entries
    }
}
