//! Metrics cache workload driver.
//!
//! Builds a cache, fills it the way the dashboard does (generic pool
//! summaries plus typed volume, user and chain records), reads it back and
//! prints the statistics as JSON.

use clap::Parser;
use serde_json::{json, Value};
use std::error::Error;
use std::fs;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use metrics_cache::cli::CacheArgs;
use metrics_cache::{
    AggregatedData, CacheConfig, CacheStore, Cli, SimulateCommand, UserMetricsData, VolumeData,
};

const PROTOCOLS: [&str; 4] = ["uniswap", "curve", "balancer", "aerodrome"];
const CHAINS: [&str; 3] = ["ethereum", "arbitrum", "base"];

/// Entry point for the workload driver.
#[tokio::main]
pub async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        SimulateCommand::Run {
            cache,
            keys,
            reads,
            wait_ms,
        } => {
            let config = load_config(&cache)?;
            run(config, keys, reads, Duration::from_millis(wait_ms)).await?;
        }
        SimulateCommand::Config { cache } => {
            let config = load_config(&cache)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Read the optional config file, then layer the flags on top.
fn load_config(args: &CacheArgs) -> Result<CacheConfig, Box<dyn Error>> {
    let base = match &args.config {
        Some(path) => serde_json::from_str::<CacheConfig>(&fs::read_to_string(path)?)?,
        None => CacheConfig::default(),
    };
    Ok(args.apply(base))
}

async fn run(
    config: CacheConfig,
    keys: usize,
    reads: usize,
    wait: Duration,
) -> Result<(), Box<dyn Error>> {
    let cache = CacheStore::new(config)?;
    info!(keys, reads, "starting workload");

    for i in 0..keys {
        let summary = json!({
            "pool": format!("pool-{}", i),
            "protocol": PROTOCOLS[i % PROTOCOLS.len()],
            "tvl": (i as f64) * 1_000.0,
        });
        cache.set(format!("pool:{}:summary", i), &summary)?;
    }

    for (i, protocol) in PROTOCOLS.iter().enumerate() {
        let scale = (i + 1) as f64;
        for pool in 0..(keys / 100).max(1) {
            cache.set_volume_data(
                protocol,
                &format!("pool-{}", pool),
                VolumeData {
                    volume_24h: 1.0e5 * scale,
                    volume_7d: 7.0e5 * scale,
                    volume_30d: 3.0e6 * scale,
                    concentration_risk: 0.1 * scale,
                },
            )?;
        }

        let users = 1_000 * (i as u64 + 1);
        cache.set_user_metrics(
            protocol,
            UserMetricsData {
                unique_users_24h: users,
                unique_users_7d: users * 5,
                unique_users_30d: users * 18,
                active_wallets: users * 2,
                new_users: users / 10,
                user_retention: 0.42,
            },
        )?;
    }

    for chain in CHAINS {
        cache.set_aggregated_metrics(
            chain,
            AggregatedData {
                total_volume_24h: 4.0e6,
                total_volume_7d: 2.6e7,
                total_volume_30d: 1.1e8,
                total_users_24h: 10_000,
                total_users_7d: 50_000,
                total_users_30d: 180_000,
                protocol_count: PROTOCOLS.len() as u32,
            },
        )?;
    }

    // A quarter of the key space beyond what was written, so some reads miss.
    let key_space = keys + keys / 4 + 1;
    for r in 0..reads {
        let key = format!("pool:{}:summary", (r * 7) % key_space);
        let _: Option<Value> = cache.get(&key);
    }

    if !wait.is_zero() {
        info!(wait_ms = wait.as_millis() as u64, "waiting for sweeps");
        tokio::time::sleep(wait).await;
    }

    let stats = cache.stats();
    info!(
        hit_rate = stats.hit_rate,
        total_entries = stats.total_entries,
        evictions = stats.evictions,
        "workload finished"
    );
    println!("{}", serde_json::to_string_pretty(&stats)?);

    cache.close();
    Ok(())
}
