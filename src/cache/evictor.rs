//! Eviction policy: decides which entries leave a tier under capacity pressure.
//!
//! Each policy maps an entry to a numeric score; entries are removed in
//! ascending score order until the requested headroom is available. Ties are
//! broken by insertion order (oldest insertion removed first) so eviction is
//! deterministic.

use std::time::Instant;

use crate::cache::entry::CacheEntry;
use crate::config::EvictionPolicy;

/// Score band separating priority levels, wide enough that no realistic
/// access count can lift an entry across a level boundary.
const PRIORITY_BAND: u128 = 1_000_000_000;

/// An eviction candidate with its computed score.
///
/// Lower score = evicted sooner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvictionCandidate {
    pub key: String,
    pub score: u128,
    pub seq: u64,
}

impl PartialOrd for EvictionCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EvictionCandidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.score.cmp(&other.score).then(self.seq.cmp(&other.seq))
    }
}

/// Compute the eviction score for a single entry.
///
/// `epoch` is the owning tier's creation instant; timestamps are expressed
/// as nanoseconds since it so they fit an integer score.
pub fn score_entry<V>(entry: &CacheEntry<V>, policy: EvictionPolicy, epoch: Instant) -> u128 {
    match policy {
        EvictionPolicy::Recency => entry
            .last_accessed_at()
            .saturating_duration_since(epoch)
            .as_nanos(),
        EvictionPolicy::Frequency => entry.access_count() as u128,
        EvictionPolicy::Expiry => match entry.expires_at() {
            Some(deadline) => deadline.saturating_duration_since(epoch).as_nanos(),
            // Entries without a TTL sort last.
            None => u128::MAX,
        },
        EvictionPolicy::Priority => {
            entry.priority().rank() as u128 * PRIORITY_BAND + entry.access_count() as u128
        }
    }
}

/// Order all entries for eviction under the given policy.
///
/// Returns candidates sorted so that the first element is the next victim.
pub fn eviction_order<'a, V: 'a>(
    entries: impl Iterator<Item = &'a CacheEntry<V>>,
    policy: EvictionPolicy,
    epoch: Instant,
) -> Vec<EvictionCandidate> {
    let mut candidates: Vec<EvictionCandidate> = entries
        .map(|entry| EvictionCandidate {
            key: entry.key().to_string(),
            score: score_entry(entry, policy, epoch),
            seq: entry.seq(),
        })
        .collect();

    candidates.sort();
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::entry::{normalize_tags, Priority};
    use std::sync::Arc;
    use std::time::Duration;

    fn make_entry(
        key: &str,
        seq: u64,
        ttl: Option<Duration>,
        priority: Priority,
    ) -> CacheEntry<String> {
        CacheEntry::new(
            key.to_string(),
            Arc::new("v".to_string()),
            16,
            ttl,
            priority,
            normalize_tags::<_, &str>([]),
            seq,
        )
    }

    #[test]
    fn test_recency_orders_by_last_access() {
        let epoch = Instant::now();
        let stale = make_entry("stale", 0, None, Priority::Medium);
        std::thread::sleep(Duration::from_millis(2));
        let mut fresh = make_entry("fresh", 1, None, Priority::Medium);
        fresh.touch();

        let entries = vec![fresh, stale];
        let order = eviction_order(entries.iter(), EvictionPolicy::Recency, epoch);
        assert_eq!(order[0].key, "stale");
    }

    #[test]
    fn test_frequency_orders_by_access_count() {
        let epoch = Instant::now();
        let cold = make_entry("cold", 0, None, Priority::Medium);
        let mut hot = make_entry("hot", 1, None, Priority::Medium);
        hot.touch();
        hot.touch();

        let entries = vec![hot, cold];
        let order = eviction_order(entries.iter(), EvictionPolicy::Frequency, epoch);
        assert_eq!(order[0].key, "cold");
    }

    #[test]
    fn test_expiry_orders_by_deadline_with_no_ttl_last() {
        let epoch = Instant::now();
        let soon = make_entry("soon", 0, Some(Duration::from_secs(10)), Priority::Medium);
        let late = make_entry("late", 1, Some(Duration::from_secs(1000)), Priority::Medium);
        let forever = make_entry("forever", 2, None, Priority::Medium);

        let entries = vec![forever, late, soon];
        let order = eviction_order(entries.iter(), EvictionPolicy::Expiry, epoch);
        assert_eq!(order[0].key, "soon");
        assert_eq!(order[1].key, "late");
        assert_eq!(order[2].key, "forever");
    }

    #[test]
    fn test_expiry_scoring_survives_huge_ttl() {
        // A TTL that overflows `Instant` arithmetic must score like an entry
        // without a TTL instead of panicking.
        let epoch = Instant::now();
        let soon = make_entry("soon", 0, Some(Duration::from_secs(10)), Priority::Medium);
        let huge = make_entry("huge", 1, Some(Duration::MAX), Priority::Medium);

        assert_eq!(
            score_entry(&huge, EvictionPolicy::Expiry, epoch),
            u128::MAX
        );

        let entries = vec![huge, soon];
        let order = eviction_order(entries.iter(), EvictionPolicy::Expiry, epoch);
        assert_eq!(order[0].key, "soon");
        assert_eq!(order[1].key, "huge");
    }

    #[test]
    fn test_priority_bands_dominate_access_counts() {
        let epoch = Instant::now();
        let mut low_hot = make_entry("low_hot", 0, None, Priority::Low);
        for _ in 0..10_000 {
            low_hot.touch();
        }
        let critical_cold = make_entry("critical_cold", 1, None, Priority::Critical);

        let entries = vec![critical_cold, low_hot];
        let order = eviction_order(entries.iter(), EvictionPolicy::Priority, epoch);
        assert_eq!(order[0].key, "low_hot");
        assert_eq!(order[1].key, "critical_cold");
    }

    #[test]
    fn test_ties_broken_by_insertion_order() {
        let epoch = Instant::now();
        // Same access count, so frequency scores tie.
        let first = make_entry("first", 0, None, Priority::Medium);
        let second = make_entry("second", 1, None, Priority::Medium);

        let entries = vec![second, first];
        let order = eviction_order(entries.iter(), EvictionPolicy::Frequency, epoch);
        assert_eq!(order[0].key, "first");
        assert_eq!(order[1].key, "second");
    }
}
