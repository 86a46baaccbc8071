//! Benchmarks for the metrics cache.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use metrics_cache::{CacheConfig, CacheStore, VolumeData};
use serde_json::{json, Value};
use std::time::Duration;

/// A cache without the background sweep, so no runtime is needed.
fn cache(max_entries: usize) -> CacheStore {
    let config = CacheConfig::new()
        .max_entries(max_entries)
        .cleanup_interval(Duration::ZERO)
        .build();
    CacheStore::new(config).expect("cache without sweeper")
}

fn summary(i: usize) -> Value {
    json!({"pool": format!("pool-{}", i), "tvl": i * 1_000, "fee_tier": 3000})
}

/// Benchmark single-threaded get/set operations.
fn bench_single_threaded(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_threaded");

    let cache = cache(100_000);

    // Pre-populate some keys
    for i in 0..10_000 {
        cache.set(format!("key_{}", i), &summary(i)).unwrap();
    }

    group.bench_function("get_existing", |b| {
        let mut i = 0;
        b.iter(|| {
            let key = format!("key_{}", i % 10_000);
            black_box(cache.get::<Value>(&key));
            i += 1;
        });
    });

    group.bench_function("get_missing", |b| {
        let mut i = 0;
        b.iter(|| {
            let key = format!("missing_{}", i);
            black_box(cache.get::<Value>(&key));
            i += 1;
        });
    });

    group.bench_function("set_existing", |b| {
        let mut i = 0;
        b.iter(|| {
            let key = format!("key_{}", i % 10_000);
            cache.set(key, &summary(i)).unwrap();
            i += 1;
        });
    });

    group.bench_function("set_volume_data", |b| {
        let mut i = 0;
        b.iter(|| {
            let data = VolumeData {
                volume_24h: i as f64,
                volume_7d: 7.0 * i as f64,
                volume_30d: 30.0 * i as f64,
                concentration_risk: 0.2,
            };
            cache
                .set_volume_data("uniswap", &format!("pool-{}", i % 1_000), data)
                .unwrap();
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark concurrent operations.
fn bench_concurrent(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent");

    for num_threads in [2, 4, 8].iter() {
        let cache = cache(100_000);

        // Pre-populate
        for i in 0..10_000 {
            cache.set(format!("key_{}", i), &summary(i)).unwrap();
        }

        group.throughput(Throughput::Elements(1000));
        group.bench_with_input(
            BenchmarkId::new("mixed_ops", num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let handles: Vec<_> = (0..num_threads)
                        .map(|t| {
                            let cache = cache.clone();
                            std::thread::spawn(move || {
                                for i in 0..1000 {
                                    let key = format!("key_{}", (t * 1000 + i) % 10_000);
                                    if i % 5 == 0 {
                                        cache.set(key, &i).unwrap();
                                    } else {
                                        black_box(cache.get::<Value>(&key));
                                    }
                                }
                            })
                        })
                        .collect();

                    for handle in handles {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

/// Benchmark batch eviction under pressure.
fn bench_eviction(c: &mut Criterion) {
    let mut group = c.benchmark_group("eviction");

    for max_entries in [1_000, 10_000].iter() {
        let cache = cache(*max_entries);

        // Fill the cache
        for i in 0..*max_entries {
            cache.set(format!("key_{}", i), &i).unwrap();
        }

        group.bench_with_input(
            BenchmarkId::new("set_with_prune", max_entries),
            max_entries,
            |b, &max_entries| {
                let mut i = max_entries;
                b.iter(|| {
                    cache.set(format!("key_{}", i), &i).unwrap();
                    i += 1;
                });
            },
        );
    }

    group.finish();
}

/// Benchmark a sweep over a store where half the entries have expired.
fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep");

    group.bench_function("cleanup_half_expired", |b| {
        b.iter_batched(
            || {
                let cache = cache(0);
                for i in 0..10_000 {
                    let ttl = if i % 2 == 0 {
                        Duration::ZERO
                    } else {
                        Duration::from_secs(300)
                    };
                    cache.set_with_ttl(format!("key_{}", i), &i, ttl).unwrap();
                }
                cache
            },
            |cache| black_box(cache.cleanup_expired()),
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_single_threaded,
    bench_concurrent,
    bench_eviction,
    bench_sweep,
);
criterion_main!(benches);
