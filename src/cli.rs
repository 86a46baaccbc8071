//! Command-line interface definitions.
//!
//! This module defines the CLI of the `simulate` driver using clap. The
//! driver builds a cache from flags, runs a synthetic dashboard workload
//! against it and prints the resulting statistics.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::CacheConfig;

/// Metrics cache workload driver.
#[derive(Parser, Debug)]
#[command(name = "simulate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The command to execute.
    #[clap(subcommand)]
    pub command: SimulateCommand,
}

/// Cache settings shared by every command.
///
/// Flags override values loaded from `--config`.
#[derive(Args, Debug, Clone, Default)]
pub struct CacheArgs {
    /// JSON file with cache settings (`default_ttl_ms`, `max_entries`, ...).
    #[arg(long, env = "METRICS_CACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Capacity bound of the generic store; 0 for unlimited.
    #[arg(long, env = "METRICS_CACHE_MAX_ENTRIES")]
    pub max_entries: Option<usize>,

    /// TTL applied to generic entries, in milliseconds.
    #[arg(long, env = "METRICS_CACHE_DEFAULT_TTL_MS")]
    pub default_ttl_ms: Option<u64>,

    /// Sweep period in milliseconds; 0 disables the background sweep.
    #[arg(long, env = "METRICS_CACHE_CLEANUP_INTERVAL_MS")]
    pub cleanup_interval_ms: Option<u64>,

    /// Expiry of typed metric records in milliseconds; 0 keeps them.
    #[arg(long, env = "METRICS_CACHE_TYPED_VIEW_TTL_MS")]
    pub typed_view_ttl_ms: Option<u64>,

    /// Do not record hit/miss counters.
    #[arg(long)]
    pub disable_stats: bool,
}

impl CacheArgs {
    /// Apply the flags that were given on top of `config`.
    pub fn apply(&self, mut config: CacheConfig) -> CacheConfig {
        if let Some(max) = self.max_entries {
            config = config.max_entries(max);
        }
        if let Some(ms) = self.default_ttl_ms {
            config = config.default_ttl(Duration::from_millis(ms));
        }
        if let Some(ms) = self.cleanup_interval_ms {
            config = config.cleanup_interval(Duration::from_millis(ms));
        }
        if let Some(ms) = self.typed_view_ttl_ms {
            config = config.typed_view_ttl(Duration::from_millis(ms));
        }
        if self.disable_stats {
            config = config.enable_stats(false);
        }
        config
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum SimulateCommand {
    /// Run a synthetic workload and print the cache statistics.
    ///
    /// Writes generic pool summaries plus volume, user and chain records,
    /// then reads a mix of present and absent keys.
    Run {
        #[command(flatten)]
        cache: CacheArgs,

        /// Number of generic keys to write.
        #[arg(long, default_value_t = 1_000)]
        keys: usize,

        /// Number of generic reads to perform.
        #[arg(long, default_value_t = 5_000)]
        reads: usize,

        /// Time to wait before collecting stats, letting sweeps run.
        #[arg(long, default_value_t = 0)]
        wait_ms: u64,
    },

    /// Print the effective cache configuration as JSON.
    Config {
        #[command(flatten)]
        cache: CacheArgs,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_defaults() {
        let cli = Cli::parse_from(["test", "run"]);
        match cli.command {
            SimulateCommand::Run {
                keys,
                reads,
                wait_ms,
                cache,
            } => {
                assert_eq!(keys, 1_000);
                assert_eq!(reads, 5_000);
                assert_eq!(wait_ms, 0);
                assert!(cache.config.is_none());
                assert!(!cache.disable_stats);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_parse_run_with_cache_flags() {
        let cli = Cli::parse_from([
            "test",
            "run",
            "--max-entries",
            "50",
            "--default-ttl-ms",
            "250",
            "--keys",
            "80",
        ]);
        match cli.command {
            SimulateCommand::Run { cache, keys, .. } => {
                assert_eq!(keys, 80);
                assert_eq!(cache.max_entries, Some(50));
                assert_eq!(cache.default_ttl_ms, Some(250));
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_parse_config() {
        let cli = Cli::parse_from(["test", "config", "--disable-stats"]);
        match cli.command {
            SimulateCommand::Config { cache } => assert!(cache.disable_stats),
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn test_apply_overrides_only_given_flags() {
        let base = CacheConfig::new().default_ttl(Duration::from_secs(9));
        let args = CacheArgs {
            max_entries: Some(0),
            cleanup_interval_ms: Some(0),
            ..Default::default()
        };

        let config = args.apply(base);
        assert_eq!(config.get_default_ttl(), Duration::from_secs(9));
        assert_eq!(config.get_max_entries(), None);
        assert_eq!(config.get_cleanup_interval(), None);
        assert!(config.stats_enabled());
    }
}
