use std::time::Duration;

use crate::config::SupervisorConfig;

/// Counters from one timeout sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeoutSweepOutcome {
    /// Dispatched, unfinished jobs inspected.
    pub examined: u64,
    /// Jobs past their inactivity threshold.
    pub timed_out: u64,
    /// New timeout messages created.
    pub enqueued: u64,
    /// Timed-out jobs that already had a live timeout message.
    pub already_queued: u64,
    /// Candidates skipped because of an error.
    pub failed: u64,
}

/// Counters from one snapshot reconciliation sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotSweepOutcome {
    /// `EvmSnapshot` rows inspected.
    pub examined: u64,
    /// Snapshots whose owning job is still running.
    pub kept_active: u64,
    /// Cleanup candidates younger than the grace window.
    pub within_grace: u64,
    /// New removal messages created.
    pub enqueued: u64,
    /// Candidates that already had a live removal message.
    pub already_queued: u64,
    /// Candidates whose target entity no longer exists.
    pub target_missing: u64,
    /// Candidates skipped because of an error.
    pub failed: u64,
}

/// Cadence for [`super::run_supervisor_loop`].
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub timeout_check_interval: Duration,
    pub snapshot_check_interval: Duration,
    /// Optional tick limit (both sweeps counted); `None` runs until Ctrl+C.
    pub max_ticks: Option<u64>,
}

impl SchedulerConfig {
    pub fn from_supervisor_config(config: &SupervisorConfig) -> Self {
        Self {
            timeout_check_interval: config.timeout_check_interval,
            snapshot_check_interval: config.snapshot_check_interval,
            max_ticks: None,
        }
    }

    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }
}

/// Aggregated scheduler counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerOutcome {
    pub timeout_sweeps: u64,
    pub snapshot_sweeps: u64,
    /// Sweeps that failed as a whole (e.g. store unavailable).
    pub failed_sweeps: u64,
    pub timeouts_enqueued: u64,
    pub removals_enqueued: u64,
}

impl SchedulerOutcome {
    pub const fn ticks(&self) -> u64 {
        self.timeout_sweeps + self.snapshot_sweeps + self.failed_sweeps
    }
}
