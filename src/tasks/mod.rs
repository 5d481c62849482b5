//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - TTL Cleanup: Removes expired cache entries at configured intervals
//! - Stats Reporter: Samples throughput and derives a health verdict

mod cleanup;
mod reporter;

pub use cleanup::{CleanupSweeper, SweeperStats};
pub use reporter::{
    evaluate, HealthIssue, HealthReport, HealthStatus, ProcessMetrics, StatsReporter,
    SAMPLE_WINDOW,
};
