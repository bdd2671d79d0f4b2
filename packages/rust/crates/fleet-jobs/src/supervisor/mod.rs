//! Timeout and snapshot reconciliation sweeps, plus the loop that schedules them.
//!
//! Both sweeps are `JobService` methods and only talk to each other through
//! the store and the work queue.

mod runner;
mod snapshots;
mod timeout;
mod types;

pub use runner::run_supervisor_loop;
pub use types::{SchedulerConfig, SchedulerOutcome, SnapshotSweepOutcome, TimeoutSweepOutcome};
