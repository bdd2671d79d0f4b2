use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use tokio::time::MissedTickBehavior;

use crate::observability::SupervisorEvent;
use crate::service::JobService;

use super::types::{SchedulerConfig, SchedulerOutcome};

/// Run both sweeps on their own cadence until `max_ticks` or Ctrl+C.
///
/// A failed sweep is logged and counted; the loop keeps going.
pub async fn run_supervisor_loop(
    service: Arc<JobService>,
    config: SchedulerConfig,
) -> Result<SchedulerOutcome> {
    if config.max_ticks == Some(0) {
        bail!("max_ticks must be greater than zero when provided");
    }

    let timeout_every = config.timeout_check_interval.max(Duration::from_secs(1));
    let snapshot_every = config.snapshot_check_interval.max(Duration::from_secs(1));
    let mut timeout_ticker = tokio::time::interval(timeout_every);
    timeout_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut snapshot_ticker = tokio::time::interval(snapshot_every);
    snapshot_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        event = SupervisorEvent::SchedulerStarted.as_str(),
        timeout_check_interval_secs = timeout_every.as_secs(),
        snapshot_check_interval_secs = snapshot_every.as_secs(),
        max_ticks = ?config.max_ticks,
        "supervisor loop started"
    );

    let job_not_found_delay = service.config().job_not_found_delay;
    let mut outcome = SchedulerOutcome::default();
    let mut interrupted = false;

    loop {
        let reached_limit = config
            .max_ticks
            .is_some_and(|max_ticks| outcome.ticks() >= max_ticks);
        if reached_limit || interrupted {
            break;
        }

        tokio::select! {
            _ = timeout_ticker.tick() => {
                match service.check_jobs_for_timeout().await {
                    Ok(sweep) => {
                        outcome.timeout_sweeps += 1;
                        outcome.timeouts_enqueued += sweep.enqueued;
                    }
                    Err(_) => outcome.failed_sweeps += 1,
                }
            }
            _ = snapshot_ticker.tick() => {
                match service.check_for_evm_snapshots(job_not_found_delay).await {
                    Ok(sweep) => {
                        outcome.snapshot_sweeps += 1;
                        outcome.removals_enqueued += sweep.enqueued;
                    }
                    Err(_) => outcome.failed_sweeps += 1,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                interrupted = true;
                tracing::info!(
                    timeout_sweeps = outcome.timeout_sweeps,
                    snapshot_sweeps = outcome.snapshot_sweeps,
                    "supervisor loop received Ctrl+C; stopping"
                );
            }
        }
    }

    tracing::info!(
        event = SupervisorEvent::SchedulerStopped.as_str(),
        timeout_sweeps = outcome.timeout_sweeps,
        snapshot_sweeps = outcome.snapshot_sweeps,
        failed_sweeps = outcome.failed_sweeps,
        timeouts_enqueued = outcome.timeouts_enqueued,
        removals_enqueued = outcome.removals_enqueued,
        "supervisor loop stopped"
    );
    Ok(outcome)
}
