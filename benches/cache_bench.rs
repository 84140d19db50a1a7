//! Benchmarks for the cache subsystem.

use std::sync::Arc;
use std::time::Instant;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use artifact_cache_tier::cache::entry::{CacheEntry, Priority, PutOptions};
use artifact_cache_tier::cache::evictor::eviction_order;
use artifact_cache_tier::cache::tier::TierStore;
use artifact_cache_tier::config::{EvictionPolicy, TierConfig};

fn bench_eviction_ordering(c: &mut Criterion) {
    let epoch = Instant::now();

    // 10,000 entries with varied access counts.
    let entries: Vec<CacheEntry<String>> = (0..10_000u64)
        .map(|i| {
            let mut entry = CacheEntry::new(
                format!("k{i}"),
                Arc::new("payload".to_string()),
                128,
                None,
                Priority::Medium,
                Default::default(),
                i,
            );
            for _ in 0..(i % 64) {
                entry.touch();
            }
            entry
        })
        .collect();

    c.bench_function("eviction_order_frequency_10k", |b| {
        b.iter(|| {
            let order = eviction_order(
                black_box(entries.iter()),
                EvictionPolicy::Frequency,
                epoch,
            );
            black_box(order);
        })
    });

    c.bench_function("eviction_order_recency_10k", |b| {
        b.iter(|| {
            let order = eviction_order(black_box(entries.iter()), EvictionPolicy::Recency, epoch);
            black_box(order);
        })
    });
}

fn bench_tier_put_get(c: &mut Criterion) {
    let config = TierConfig {
        max_size_bytes: 1 << 30,
        max_entries: 1 << 20,
        default_ttl_secs: 0,
        eviction_policy: EvictionPolicy::Recency,
        persist_on_write: false,
    };

    c.bench_function("tier_put_1k", |b| {
        b.iter(|| {
            let mut tier: TierStore<String> = TierStore::new("bench", config.clone());
            for i in 0..1000 {
                tier.put(
                    &format!("k{i}"),
                    Arc::new("x".repeat(256)),
                    &PutOptions::default(),
                )
                .unwrap();
            }
            black_box(tier.len());
        })
    });

    let mut tier: TierStore<String> = TierStore::new("bench", config);
    for i in 0..1000 {
        tier.put(
            &format!("k{i}"),
            Arc::new("x".repeat(256)),
            &PutOptions::default(),
        )
        .unwrap();
    }

    c.bench_function("tier_get_hit", |b| {
        b.iter(|| {
            black_box(tier.get(black_box("k500")));
        })
    });
}

fn bench_put_under_pressure(c: &mut Criterion) {
    // Small tier, so every insert evicts.
    let config = TierConfig {
        max_size_bytes: 64 * 1024,
        max_entries: 128,
        default_ttl_secs: 0,
        eviction_policy: EvictionPolicy::Recency,
        persist_on_write: false,
    };

    let mut tier: TierStore<String> = TierStore::new("bench", config);
    let mut i = 0u64;

    c.bench_function("tier_put_with_eviction", |b| {
        b.iter(|| {
            i += 1;
            tier.put(
                &format!("k{i}"),
                Arc::new("x".repeat(512)),
                &PutOptions::default(),
            )
            .unwrap();
        })
    });
}

criterion_group!(
    benches,
    bench_eviction_ordering,
    bench_tier_put_get,
    bench_put_under_pressure
);
criterion_main!(benches);
