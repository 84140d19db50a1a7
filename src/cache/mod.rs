//! Multi-tier artifact cache management.
//!
//! This module contains the core cache data structures and algorithms:
//! - [`entry`]: CacheEntry, Priority, PutOptions
//! - [`size`]: approximate byte-size estimation for cached values
//! - [`evictor`]: per-policy eviction scoring and victim ordering
//! - [`tier`]: a single bounded tier with incremental byte accounting
//! - [`stats`]: per-tier hit/miss/eviction counters and snapshots
//! - [`maintenance`]: background expiry sweeps and statistics passes
//! - [`manager`]: the public façade owning all tiers

pub mod entry;
pub mod error;
pub mod evictor;
pub mod maintenance;
pub mod manager;
pub mod size;
pub mod stats;
pub mod tier;
