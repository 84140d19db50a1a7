//! Per-tier hit/miss/eviction accounting.
//!
//! The tracker holds only monotonic counters; hit rate and average access
//! time are derived on demand in the snapshot and never stored.

use std::time::Duration;

use serde::Serialize;

/// Monotonic counters for a single tier.
#[derive(Debug, Default)]
pub struct StatisticsTracker {
    hits: u64,
    misses: u64,
    evictions: u64,
    total_access_time: Duration,
}

impl StatisticsTracker {
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_access_time(&mut self, elapsed: Duration) {
        self.total_access_time += elapsed;
    }

    /// Derive a read-only snapshot, combining the counters with the tier's
    /// live entry count and byte usage.
    pub fn snapshot(&self, entries: usize, current_size_bytes: u64) -> TierStatistics {
        let requests = self.hits + self.misses;
        let hit_rate = if requests == 0 {
            0.0
        } else {
            self.hits as f64 / requests as f64
        };
        let average_access_time_us = if self.hits == 0 {
            0.0
        } else {
            self.total_access_time.as_micros() as f64 / self.hits as f64
        };

        TierStatistics {
            hits: self.hits,
            misses: self.misses,
            hit_rate,
            evictions: self.evictions,
            entries,
            current_size_bytes,
            average_access_time_us,
        }
    }
}

/// Point-in-time statistics snapshot for one tier.
#[derive(Debug, Clone, Serialize)]
pub struct TierStatistics {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub evictions: u64,
    pub entries: usize,
    pub current_size_bytes: u64,
    /// Mean per-hit access latency in microseconds.
    pub average_access_time_us: f64,
}
