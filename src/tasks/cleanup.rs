//! TTL Cleanup Sweeper
//!
//! Background task that periodically removes expired cache entries, on top
//! of the lazy expiry done by reads.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::config::Config;

// == Sweeper Stats ==
/// Run history of the sweeper.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweeperStats {
    /// Completed cleanup passes, timer-driven and forced
    pub runs: u64,
    /// Expired keys removed across all passes
    pub total_expired: u64,
    pub last_run: Option<DateTime<Utc>>,
    /// Running average pass duration in milliseconds
    pub average_duration_ms: f64,
}

impl SweeperStats {
    fn record(&mut self, removed: usize, elapsed: Duration) {
        self.runs += 1;
        self.total_expired += removed as u64;
        self.last_run = Some(Utc::now());
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        self.average_duration_ms += (elapsed_ms - self.average_duration_ms) / self.runs as f64;
    }
}

// == Cleanup Sweeper ==
/// Owns the periodic cleanup task.
///
/// `start` and `stop` are idempotent. The interval of a running sweeper is
/// only changed through `reconfigure`, which restarts the timer.
#[derive(Debug)]
pub struct CleanupSweeper {
    cache: Arc<RwLock<CacheStore>>,
    interval: Mutex<Duration>,
    handle: Mutex<Option<JoinHandle<()>>>,
    stats: Arc<Mutex<SweeperStats>>,
}

impl CleanupSweeper {
    /// Creates a stopped sweeper.
    pub fn new(cache: Arc<RwLock<CacheStore>>, interval: Duration) -> Self {
        Self {
            cache,
            interval: Mutex::new(interval),
            handle: Mutex::new(None),
            stats: Arc::new(Mutex::new(SweeperStats::default())),
        }
    }

    pub fn from_config(cache: Arc<RwLock<CacheStore>>, config: &Config) -> Self {
        Self::new(cache, config.cleanup_interval())
    }

    // == Start ==
    /// Spawns the cleanup loop on the current tokio runtime.
    pub fn start(&self) {
        let mut handle = self.handle.lock();
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            info!("Cleanup sweeper already running");
            return;
        }

        let interval = *self.interval.lock();
        let cache = self.cache.clone();
        let stats = self.stats.clone();

        *handle = Some(tokio::spawn(async move {
            info!(
                "Starting TTL cleanup sweeper with interval of {} ms",
                interval.as_millis()
            );

            loop {
                tokio::time::sleep(interval).await;
                run_pass(&cache, &stats).await;
            }
        }));
    }

    // == Stop ==
    /// Aborts the cleanup loop.
    pub fn stop(&self) {
        match self.handle.lock().take() {
            Some(handle) => {
                handle.abort();
                info!("Cleanup sweeper stopped");
            }
            None => info!("Cleanup sweeper is not running"),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    pub fn interval(&self) -> Duration {
        *self.interval.lock()
    }

    /// Changes the interval, restarting the timer if it was running.
    pub fn reconfigure(&self, interval: Duration) {
        let was_running = self.is_running();
        if was_running {
            self.stop();
        }
        *self.interval.lock() = interval;
        if was_running {
            self.start();
        }
    }

    // == Force Cleanup ==
    /// Runs one pass immediately, independent of the timer.
    pub async fn force_cleanup(&self) -> usize {
        run_pass(&self.cache, &self.stats).await
    }

    pub fn stats(&self) -> SweeperStats {
        self.stats.lock().clone()
    }
}

impl Drop for CleanupSweeper {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            handle.abort();
        }
    }
}

async fn run_pass(cache: &RwLock<CacheStore>, stats: &Mutex<SweeperStats>) -> usize {
    let started = Instant::now();
    let removed = {
        let mut cache_guard = cache.write().await;
        cache_guard.cleanup_expired()
    };
    stats.lock().record(removed, started.elapsed());

    if removed > 0 {
        info!("TTL cleanup: removed {} expired entries", removed);
    } else {
        debug!("TTL cleanup: no expired entries found");
    }
    removed
}
