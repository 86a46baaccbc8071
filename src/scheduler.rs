//! Background sweep of expired entries.
//!
//! The sweeper is a tokio task that wakes every `cleanup_interval` and
//! removes entries that are strictly past their expiry. It holds only a weak
//! reference to the store, so it winds down on its own once every handle is
//! dropped.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::{CacheError, CacheResult};
use crate::storage::Db;

/// Owner of the sweep task. Stopping is idempotent.
#[derive(Debug, Default)]
pub(crate) struct Sweeper {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Sweeper {
    /// A sweeper with no task, for caches with the scheduler disabled.
    pub(crate) fn disabled() -> Self {
        Self::default()
    }

    /// Spawn the sweep task on the current tokio runtime.
    ///
    /// The first tick fires one full `period` after this call.
    pub(crate) fn start(db: &Arc<Db>, period: Duration) -> CacheResult<Self> {
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
        let db = Arc::downgrade(db);
        let first_tick = Instant::now() + period;

        let task = runtime.spawn(run(db, first_tick, period));
        info!(period_ms = period.as_millis() as u64, "cache sweeper started");

        Ok(Self {
            task: Mutex::new(Some(task)),
        })
    }

    /// Cancel the sweep task. Returns `true` if a task was running.
    pub(crate) fn stop(&self) -> bool {
        let task = match self.task.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match task {
            Some(task) => {
                task.abort();
                info!("cache sweeper stopped");
                true
            }
            None => false,
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(db: Weak<Db>, first_tick: Instant, period: Duration) {
    let mut ticker = time::interval_at(first_tick, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let Some(store) = db.upgrade() else {
            debug!("cache dropped, sweeper exiting");
            return;
        };
        if store.scheduled_sweep().is_none() {
            return;
        }
    }
}
