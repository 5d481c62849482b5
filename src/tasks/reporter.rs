//! Stats Reporter
//!
//! Samples cache counters once per second and turns them, together with
//! process memory figures, into a health verdict. Purely observational.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{CacheStore, StatsSnapshot};
use crate::tasks::{CleanupSweeper, SweeperStats};

/// Samples kept in the rolling window
pub const SAMPLE_WINDOW: usize = 60;
/// Samples used for the ops/sec estimate
const THROUGHPUT_SAMPLES: usize = 10;
const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

const CACHE_MEMORY_CRITICAL: f64 = 0.90;
const CACHE_MEMORY_WARNING: f64 = 0.75;
const PROCESS_MEMORY_WARNING: f64 = 0.85;
const HIT_RATE_WARNING: f64 = 50.0;
/// Reads needed before the hit rate or throughput is judged
const MIN_READS_FOR_VERDICT: u64 = 100;
const LOW_THROUGHPUT_OPS: f64 = 1.0;

// == Health Types ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthIssue {
    pub severity: HealthStatus,
    pub message: String,
}

impl HealthIssue {
    fn warning(message: String) -> Self {
        Self {
            severity: HealthStatus::Warning,
            message,
        }
    }

    fn critical(message: String) -> Self {
        Self {
            severity: HealthStatus::Critical,
            message,
        }
    }
}

/// Resident memory of this process against total system memory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessMetrics {
    pub resident_memory_bytes: u64,
    pub total_memory_bytes: u64,
    pub memory_ratio: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub issues: Vec<HealthIssue>,
    pub timestamp: DateTime<Utc>,
    pub ops_per_second: f64,
    pub cache: StatsSnapshot,
    pub process: ProcessMetrics,
    pub cleanup: SweeperStats,
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    /// Lifetime reads plus writes
    total_operations: u64,
}

// == Stats Reporter ==
pub struct StatsReporter {
    cache: Arc<RwLock<CacheStore>>,
    sweeper: Arc<CleanupSweeper>,
    samples: Arc<Mutex<VecDeque<Sample>>>,
    system: Mutex<System>,
    /// None when the platform cannot report our pid
    pid: Option<Pid>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl StatsReporter {
    pub fn new(cache: Arc<RwLock<CacheStore>>, sweeper: Arc<CleanupSweeper>) -> Self {
        Self {
            cache,
            sweeper,
            samples: Arc::new(Mutex::new(VecDeque::with_capacity(SAMPLE_WINDOW))),
            system: Mutex::new(System::new()),
            pid: sysinfo::get_current_pid().ok(),
            handle: Mutex::new(None),
        }
    }

    /// Starts the once-per-second sampler. No-op when already running.
    pub fn start(&self) {
        let mut handle = self.handle.lock();
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            debug!("Stats reporter already running");
            return;
        }

        let cache = self.cache.clone();
        let samples = self.samples.clone();
        *handle = Some(tokio::spawn(async move {
            info!("Stats reporter sampling every {:?}", SAMPLE_INTERVAL);
            loop {
                tokio::time::sleep(SAMPLE_INTERVAL).await;
                record_sample(&cache, &samples).await;
            }
        }));
    }

    pub fn stop(&self) {
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
            info!("Stats reporter stopped");
        }
    }

    /// Takes one sample immediately.
    pub async fn sample(&self) {
        record_sample(&self.cache, &self.samples).await;
    }

    pub fn sample_count(&self) -> usize {
        self.samples.lock().len()
    }

    /// Average operations (reads and writes) per second over the last ten
    /// samples.
    pub fn ops_per_second(&self) -> f64 {
        let samples = self.samples.lock();
        let recent: Vec<&Sample> = samples.iter().rev().take(THROUGHPUT_SAMPLES).collect();
        match (recent.first(), recent.last()) {
            (Some(newest), Some(oldest)) if recent.len() >= 2 => {
                newest.total_operations.saturating_sub(oldest.total_operations) as f64
                    / (recent.len() - 1) as f64
            }
            _ => 0.0,
        }
    }

    /// Builds the current health report.
    pub async fn health(&self) -> HealthReport {
        let cache = self.cache.read().await.stats();
        let process = self.process_metrics();
        let ops_per_second = self.ops_per_second();
        let (status, issues) = evaluate(&cache, &process, ops_per_second, self.sample_count());

        HealthReport {
            status,
            issues,
            timestamp: Utc::now(),
            ops_per_second,
            cache,
            process,
            cleanup: self.sweeper.stats(),
        }
    }

    fn process_metrics(&self) -> ProcessMetrics {
        let mut system = self.system.lock();
        system.refresh_memory();

        let total_memory_bytes = system.total_memory();
        let resident_memory_bytes = match self.pid {
            Some(pid) => {
                system.refresh_processes(ProcessesToUpdate::Some(&[pid]));
                system.process(pid).map(|process| process.memory()).unwrap_or(0)
            }
            None => 0,
        };
        let memory_ratio = if total_memory_bytes == 0 {
            0.0
        } else {
            resident_memory_bytes as f64 / total_memory_bytes as f64
        };

        ProcessMetrics {
            resident_memory_bytes,
            total_memory_bytes,
            memory_ratio,
        }
    }
}

impl fmt::Debug for StatsReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatsReporter")
            .field("samples", &self.sample_count())
            .field("running", &self.handle.lock().is_some())
            .finish()
    }
}

impl Drop for StatsReporter {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            handle.abort();
        }
    }
}

async fn record_sample(cache: &RwLock<CacheStore>, samples: &Mutex<VecDeque<Sample>>) {
    let total_operations = cache.read().await.stats().total_operations();
    let mut samples = samples.lock();
    if samples.len() == SAMPLE_WINDOW {
        samples.pop_front();
    }
    samples.push_back(Sample { total_operations });
}

/// Applies the health thresholds. Critical beats warning beats healthy.
pub fn evaluate(
    cache: &StatsSnapshot,
    process: &ProcessMetrics,
    ops_per_second: f64,
    sample_count: usize,
) -> (HealthStatus, Vec<HealthIssue>) {
    let mut issues = Vec::new();

    let memory_ratio = cache.memory_ratio();
    if memory_ratio > CACHE_MEMORY_CRITICAL {
        issues.push(HealthIssue::critical(format!(
            "Cache memory at {:.1}% of limit",
            memory_ratio * 100.0
        )));
    } else if memory_ratio > CACHE_MEMORY_WARNING {
        issues.push(HealthIssue::warning(format!(
            "Cache memory at {:.1}% of limit",
            memory_ratio * 100.0
        )));
    }

    if process.memory_ratio > PROCESS_MEMORY_WARNING {
        issues.push(HealthIssue::warning(format!(
            "Process memory at {:.1}% of system memory",
            process.memory_ratio * 100.0
        )));
    }

    let enough_reads = cache.total_reads() >= MIN_READS_FOR_VERDICT;
    if enough_reads && cache.hit_rate < HIT_RATE_WARNING {
        issues.push(HealthIssue::warning(format!(
            "Low hit rate: {:.2}%",
            cache.hit_rate
        )));
    }

    if enough_reads && sample_count >= THROUGHPUT_SAMPLES && ops_per_second < LOW_THROUGHPUT_OPS {
        issues.push(HealthIssue::warning(format!(
            "Low throughput: {:.2} ops/sec",
            ops_per_second
        )));
    }

    let status = issues
        .iter()
        .map(|issue| issue.severity)
        .max()
        .unwrap_or(HealthStatus::Healthy);
    (status, issues)
}
