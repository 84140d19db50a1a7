//! Cache entry types and per-write overrides.
//!
//! An entry is the unit of storage within a tier: an opaque payload plus the
//! access metadata the eviction policies score on. The payload is held behind
//! an `Arc` so `get` can hand out shared snapshots without copying.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Entry priority, ordered `Low < Medium < High < Critical`.
///
/// Only the `priority` eviction policy reads this; `Critical` entries are
/// evicted only when nothing else remains in the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Numeric rank used by the priority eviction score (lower = evict sooner).
    pub fn rank(&self) -> u64 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
            Priority::Critical => 3,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// Per-write overrides for `put`.
///
/// A `None` TTL means "use the tier's default". An explicit
/// `Duration::ZERO` TTL marks the entry as immediately expired.
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    pub ttl: Option<Duration>,
    pub priority: Option<Priority>,
    pub tags: Vec<String>,
}

impl PutOptions {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Normalize informational tags: trim whitespace, drop empties, deduplicate.
pub fn normalize_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// A single cache entry.
///
/// `size_bytes` is computed once at insert time and never recomputed; an
/// update replaces the entry wholesale. Only `access_count` and
/// `last_accessed_at` mutate in place, on `get`.
#[derive(Debug)]
pub struct CacheEntry<V> {
    key: String,
    value: Arc<V>,
    size_bytes: u64,
    access_count: u64,
    created_at: Instant,
    last_accessed_at: Instant,
    ttl: Option<Duration>,
    priority: Priority,
    tags: BTreeSet<String>,
    /// Monotonic insertion sequence within the tier, used as the
    /// deterministic eviction tie-break (oldest insertion wins removal).
    seq: u64,
}

// Manual impl: the payload is shared via `Arc`, so no `V: Clone` bound.
impl<V> Clone for CacheEntry<V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            value: Arc::clone(&self.value),
            size_bytes: self.size_bytes,
            access_count: self.access_count,
            created_at: self.created_at,
            last_accessed_at: self.last_accessed_at,
            ttl: self.ttl,
            priority: self.priority,
            tags: self.tags.clone(),
            seq: self.seq,
        }
    }
}

impl<V> CacheEntry<V> {
    pub fn new(
        key: String,
        value: Arc<V>,
        size_bytes: u64,
        ttl: Option<Duration>,
        priority: Priority,
        tags: BTreeSet<String>,
        seq: u64,
    ) -> Self {
        let now = Instant::now();
        Self {
            key,
            value,
            size_bytes,
            access_count: 1,
            created_at: now,
            last_accessed_at: now,
            ttl,
            priority,
            tags,
            seq,
        }
    }

    /// Record an access, updating the timestamp and counter.
    pub fn touch(&mut self) {
        self.last_accessed_at = Instant::now();
        self.access_count += 1;
    }

    /// Whether the entry's TTL has elapsed as of `now`.
    ///
    /// Entries without a TTL never expire. A zero TTL expires as soon as any
    /// time has passed since creation.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.ttl {
            Some(ttl) => now.saturating_duration_since(self.created_at) > ttl,
            None => false,
        }
    }

    /// Absolute expiry deadline, or `None` for entries without a TTL.
    ///
    /// A TTL large enough to overflow `Instant` also yields `None`: such an
    /// entry cannot expire within the process lifetime, so it behaves like
    /// an entry without a TTL.
    pub fn expires_at(&self) -> Option<Instant> {
        self.ttl.and_then(|ttl| self.created_at.checked_add(ttl))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Shared handle to the payload. The cache does not guarantee
    /// immutability of payload internals; callers copy on write.
    pub fn value(&self) -> Arc<V> {
        Arc::clone(&self.value)
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn last_accessed_at(&self) -> Instant {
        self.last_accessed_at
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}
