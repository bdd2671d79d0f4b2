use crate::clock::elapsed_between;
use crate::error::Result;
use crate::job::JobRecord;
use crate::observability::SupervisorEvent;
use crate::queue::PutOutcome;
use crate::service::JobService;

use super::types::TimeoutSweepOutcome;

impl JobService {
    /// Escalate dispatched jobs that stopped making progress.
    ///
    /// Each candidate is re-read before it is judged, so a job finished or
    /// updated since the listing is left alone. Per-candidate failures are
    /// logged and counted; only a failed listing fails the sweep.
    pub async fn check_jobs_for_timeout(&self) -> Result<TimeoutSweepOutcome> {
        tracing::debug!(
            event = SupervisorEvent::TimeoutSweepStarted.as_str(),
            "timeout sweep started"
        );
        let candidates = match self.jobs.list_active_unfinished().await {
            Ok(candidates) => candidates,
            Err(error) => {
                tracing::error!(
                    event = SupervisorEvent::TimeoutSweepFailed.as_str(),
                    error = %error,
                    "timeout sweep could not list dispatched jobs"
                );
                return Err(error);
            }
        };

        let mut outcome = TimeoutSweepOutcome::default();
        for candidate in candidates {
            if !self.serves_zone(candidate.zone.as_deref()) {
                continue;
            }
            outcome.examined += 1;
            match self.check_job_for_timeout(&candidate).await {
                Ok(None) => {}
                Ok(Some(put)) => {
                    outcome.timed_out += 1;
                    match put {
                        PutOutcome::Enqueued(_) => outcome.enqueued += 1,
                        PutOutcome::AlreadyQueued(_) => outcome.already_queued += 1,
                    }
                }
                Err(error) => {
                    outcome.failed += 1;
                    tracing::warn!(
                        event = SupervisorEvent::TimeoutCandidateFailed.as_str(),
                        job_id = candidate.id,
                        job_guid = %candidate.guid,
                        error = %error,
                        "timeout check failed for job; continuing sweep"
                    );
                }
            }
        }

        tracing::info!(
            event = SupervisorEvent::TimeoutSweepCompleted.as_str(),
            examined = outcome.examined,
            timed_out = outcome.timed_out,
            enqueued = outcome.enqueued,
            already_queued = outcome.already_queued,
            failed = outcome.failed,
            "timeout sweep completed"
        );
        Ok(outcome)
    }

    async fn check_job_for_timeout(&self, listed: &JobRecord) -> Result<Option<PutOutcome>> {
        let Some(job) = self.jobs.get(listed.id).await? else {
            return Ok(None);
        };
        if !job.is_dispatched_unfinished() {
            return Ok(None);
        }

        let elapsed = elapsed_between(self.clock.now(), job.updated_on);
        let threshold = self.timeout_threshold(&job);
        if elapsed <= threshold {
            return Ok(None);
        }

        tracing::debug!(
            event = SupervisorEvent::TimeoutDetected.as_str(),
            job_guid = %job.guid,
            elapsed_secs = elapsed.as_secs(),
            threshold_secs = threshold.as_secs(),
            "job exceeded inactivity threshold"
        );
        self.timeout(&job).await.map(Some)
    }

    /// `None` on either side means no zone restriction.
    pub(crate) fn serves_zone(&self, zone: Option<&str>) -> bool {
        match (self.config.my_zone.as_deref(), zone) {
            (Some(mine), Some(theirs)) => mine == theirs,
            _ => true,
        }
    }
}
