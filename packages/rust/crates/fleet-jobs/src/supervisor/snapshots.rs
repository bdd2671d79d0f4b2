use std::time::Duration;

use serde_json::json;

use crate::clock::elapsed_between;
use crate::error::Result;
use crate::observability::SupervisorEvent;
use crate::queue::{EnqueueRequest, PutOutcome, ROLE_EMS_OPERATIONS};
use crate::service::{JobService, METHOD_REMOVE_EVM_SNAPSHOT};
use crate::snapshot::{EVM_SNAPSHOT_NAME, Snapshot};

use super::types::SnapshotSweepOutcome;

/// What the sweep decided for one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SnapshotDisposition {
    /// Row vanished or belongs to a zone this process does not serve.
    Skipped,
    KeptActive,
    WithinGrace,
    TargetMissing,
    Removal(PutOutcome),
}

impl JobService {
    /// Queue removal of `EvmSnapshot` artifacts whose job is finished or gone.
    ///
    /// A candidate must be older than `job_not_found_delay`, judged by the
    /// timestamp embedded in its description; a description without one is
    /// eligible immediately. Removal is deduplicated on the exact snapshot id.
    pub async fn check_for_evm_snapshots(
        &self,
        job_not_found_delay: Duration,
    ) -> Result<SnapshotSweepOutcome> {
        tracing::debug!(
            event = SupervisorEvent::SnapshotSweepStarted.as_str(),
            job_not_found_delay_secs = job_not_found_delay.as_secs(),
            "snapshot sweep started"
        );
        let snapshots = match self.snapshots.list_by_name(EVM_SNAPSHOT_NAME).await {
            Ok(snapshots) => snapshots,
            Err(error) => {
                tracing::error!(
                    event = SupervisorEvent::SnapshotSweepFailed.as_str(),
                    error = %error,
                    "snapshot sweep could not enumerate snapshots"
                );
                return Err(error);
            }
        };

        let mut outcome = SnapshotSweepOutcome::default();
        for snapshot in snapshots {
            outcome.examined += 1;
            match self.reconcile_snapshot(&snapshot, job_not_found_delay).await {
                Ok(SnapshotDisposition::Skipped) => {}
                Ok(SnapshotDisposition::KeptActive) => outcome.kept_active += 1,
                Ok(SnapshotDisposition::WithinGrace) => outcome.within_grace += 1,
                Ok(SnapshotDisposition::TargetMissing) => outcome.target_missing += 1,
                Ok(SnapshotDisposition::Removal(PutOutcome::Enqueued(_))) => {
                    outcome.enqueued += 1;
                }
                Ok(SnapshotDisposition::Removal(PutOutcome::AlreadyQueued(_))) => {
                    outcome.already_queued += 1;
                }
                Err(error) => {
                    outcome.failed += 1;
                    tracing::warn!(
                        event = SupervisorEvent::SnapshotCandidateFailed.as_str(),
                        snapshot_id = snapshot.id,
                        target = %snapshot.target,
                        error = %error,
                        "snapshot check failed; continuing sweep"
                    );
                }
            }
        }

        tracing::info!(
            event = SupervisorEvent::SnapshotSweepCompleted.as_str(),
            examined = outcome.examined,
            kept_active = outcome.kept_active,
            within_grace = outcome.within_grace,
            enqueued = outcome.enqueued,
            already_queued = outcome.already_queued,
            target_missing = outcome.target_missing,
            failed = outcome.failed,
            "snapshot sweep completed"
        );
        Ok(outcome)
    }

    async fn reconcile_snapshot(
        &self,
        listed: &Snapshot,
        job_not_found_delay: Duration,
    ) -> Result<SnapshotDisposition> {
        let Some(snapshot) = self.snapshots.get(listed.id).await? else {
            return Ok(SnapshotDisposition::Skipped);
        };
        let parsed = snapshot.parsed_description();

        let job = match parsed.job_guid {
            Some(guid) => self.jobs.find_by_guid(guid).await?,
            None => None,
        };
        if let Some(job) = &job
            && !job.is_finished()
        {
            tracing::debug!(
                event = SupervisorEvent::SnapshotKeptActive.as_str(),
                snapshot_id = snapshot.id,
                job_guid = %job.guid,
                state = %job.state,
                "snapshot owned by a running job; keeping"
            );
            return Ok(SnapshotDisposition::KeptActive);
        }

        // Snapshots of finished jobs wait out the same window as orphans.
        if let Some(created_at) = parsed.created_at {
            let age = elapsed_between(self.clock.now(), created_at);
            if age <= job_not_found_delay {
                tracing::debug!(
                    event = SupervisorEvent::SnapshotWithinGrace.as_str(),
                    snapshot_id = snapshot.id,
                    age_secs = age.as_secs(),
                    job_not_found_delay_secs = job_not_found_delay.as_secs(),
                    "cleanup candidate still within grace window"
                );
                return Ok(SnapshotDisposition::WithinGrace);
            }
        }

        let Some(entity) = self.targets.resolve(&snapshot.target).await? else {
            tracing::warn!(
                event = SupervisorEvent::SnapshotTargetMissing.as_str(),
                snapshot_id = snapshot.id,
                target = %snapshot.target,
                "snapshot target no longer exists; cannot route removal"
            );
            return Ok(SnapshotDisposition::TargetMissing);
        };
        if !self.serves_zone(entity.zone.as_deref()) {
            return Ok(SnapshotDisposition::Skipped);
        }

        let request = EnqueueRequest::new(
            snapshot.target.kind.class_name(),
            Some(snapshot.target.id),
            METHOD_REMOVE_EVM_SNAPSHOT,
            ROLE_EMS_OPERATIONS,
        )
        .with_args(vec![json!(snapshot.id)])
        .with_zone(entity.zone.clone());
        let filter = request.live_filter().with_args(request.args.clone());
        let put = self.queue.put_unless_exists(request, &filter).await?;

        match put {
            PutOutcome::Enqueued(message_id) => tracing::info!(
                event = SupervisorEvent::SnapshotRemovalQueued.as_str(),
                snapshot_id = snapshot.id,
                target = %snapshot.target,
                zone = ?entity.zone,
                message_id,
                job_found = job.is_some(),
                "queued removal of evm snapshot"
            ),
            PutOutcome::AlreadyQueued(message_id) => tracing::debug!(
                event = SupervisorEvent::SnapshotRemovalAlreadyQueued.as_str(),
                snapshot_id = snapshot.id,
                message_id,
                "removal already queued for snapshot"
            ),
        }
        Ok(SnapshotDisposition::Removal(put))
    }
}
