//! Property tests for the cache's core guarantees.

use metrics_cache::{CacheConfig, CacheError, CacheStore, VolumeData};
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

fn lazy_cache(config: CacheConfig) -> CacheStore {
    CacheStore::new(config.cleanup_interval(Duration::ZERO)).unwrap()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Snapshot {
    label: String,
    block: u64,
    deltas: Vec<i64>,
    flags: BTreeMap<String, bool>,
    price: f64,
    series: Vec<f64>,
}

fn finite_f64() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("JSON has no NaN or infinity", |x| x.is_finite())
}

fn bits(values: &[f64]) -> Vec<u64> {
    values.iter().map(|x| x.to_bits()).collect()
}

fn snapshot() -> impl Strategy<Value = Snapshot> {
    (
        ".*",
        any::<u64>(),
        vec(any::<i64>(), 0..16),
        btree_map("[a-z]{1,8}", any::<bool>(), 0..8),
        finite_f64(),
        vec(finite_f64(), 0..16),
    )
        .prop_map(|(label, block, deltas, flags, price, series)| Snapshot {
            label,
            block,
            deltas,
            flags,
            price,
            series,
        })
}

proptest! {
    #[test]
    fn set_then_get_returns_equal_value(key in ".{0,32}", value in snapshot(), ttl_secs in 1u64..3600) {
        let cache = lazy_cache(CacheConfig::new());

        cache.set_with_ttl(key.clone(), &value, Duration::from_secs(ttl_secs)).unwrap();

        let back = cache.get::<Snapshot>(&key);
        prop_assert!(back.is_some());
        let back = back.unwrap();
        prop_assert_eq!(back.price.to_bits(), value.price.to_bits());
        prop_assert_eq!(bits(&back.series), bits(&value.series));
        prop_assert_eq!(back, value);
    }

    #[test]
    fn floats_keep_every_bit(x in finite_f64()) {
        let cache = lazy_cache(CacheConfig::new());

        cache.set("f", &x).unwrap();

        prop_assert_eq!(cache.get::<f64>("f").map(f64::to_bits), Some(x.to_bits()));
    }

    #[test]
    fn non_finite_floats_are_refused(
        x in prop_oneof![Just(f64::NAN), Just(f64::INFINITY), Just(f64::NEG_INFINITY)],
        finite in vec(finite_f64(), 0..8),
    ) {
        let cache = lazy_cache(CacheConfig::new());
        let mut series = finite;
        series.push(x);

        prop_assert!(matches!(cache.set("f", &x), Err(CacheError::Serialization(_))));
        prop_assert!(matches!(cache.set("o", &Some(x)), Err(CacheError::Serialization(_))));
        prop_assert!(matches!(cache.set("s", &series), Err(CacheError::Serialization(_))));
        prop_assert!(cache.is_empty());
    }

    #[test]
    fn size_stays_within_capacity(max in 1usize..64, extra in 0usize..128) {
        let cache = lazy_cache(CacheConfig::new().max_entries(max));

        for i in 0..(max + extra) {
            cache.set(format!("k{}", i), &i).unwrap();
            prop_assert!(cache.len() <= max);
        }
        // The most recent write always survives its own prune
        let last = format!("k{}", max + extra - 1);
        prop_assert!(cache.contains(&last));
    }

    #[test]
    fn hit_rate_matches_counts(hits in 0usize..50, misses in 0usize..50) {
        let cache = lazy_cache(CacheConfig::new());
        cache.set("present", &true).unwrap();

        for _ in 0..hits {
            prop_assert_eq!(cache.get::<bool>("present"), Some(true));
        }
        for _ in 0..misses {
            prop_assert_eq!(cache.get::<bool>("absent"), None);
        }

        let stats = cache.stats();
        let total = hits + misses;
        let expected = if total == 0 { 0.0 } else { hits as f64 / total as f64 * 100.0 };
        prop_assert!((stats.hit_rate - expected).abs() < 1e-9);
    }

    #[test]
    fn volume_view_round_trips(
        protocol in "[a-z]{1,12}",
        pool in "[a-z0-9-]{1,16}",
        volume_24h in 0.0f64..1e12,
        volume_7d in 0.0f64..1e12,
        volume_30d in 0.0f64..1e12,
        concentration_risk in 0.0f64..1.0,
    ) {
        let cache = lazy_cache(CacheConfig::new());
        let data = VolumeData { volume_24h, volume_7d, volume_30d, concentration_risk };

        cache.set_volume_data(&protocol, &pool, data).unwrap();

        let entry = cache.get_volume_data(&protocol, &pool).unwrap();
        prop_assert_eq!(entry.data(), data);
        let other_pool = format!("{}-other", pool);
        prop_assert!(cache.get_volume_data(&protocol, &other_pool).is_none());
    }
}
