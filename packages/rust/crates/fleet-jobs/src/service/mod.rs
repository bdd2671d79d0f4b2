//! Job service: creation, the commit path, destroy guard and timeout escalation.
//!
//! The sweeps that drive timeouts and snapshot cleanup live in
//! [`crate::supervisor`] as further `impl JobService` blocks.

mod backends;
mod handlers;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use uuid::Uuid;

use crate::clock::{Clock, elapsed_between};
use crate::config::SupervisorConfig;
use crate::error::{JobError, Result};
use crate::job::{DispatchStatus, JobOptions, JobRecord, JobStatus, JobStore, STATE_FINISHED};
use crate::observability::SupervisorEvent;
use crate::queue::{EnqueueRequest, PutOutcome, ROLE_SMARTSTATE, WorkQueue};
use crate::snapshot::SnapshotStore;
use crate::target::{TargetEntity, TargetRegistry};
use crate::task::{TaskRecord, TaskStore, sync_linked_task};

pub use backends::{JobBackends, MemoryBackends};
pub use handlers::{JobSubtype, RemoveSnapshotHandler, SignalAbortHandler, SignalHandler};

/// Queue `class_name` for messages addressed to a job row.
pub const JOB_CLASS_NAME: &str = "Job";
/// Job-subtype progression signal.
pub const METHOD_SIGNAL: &str = "signal";
/// Forced termination, delivered for timeouts.
pub const METHOD_SIGNAL_ABORT: &str = "signal_abort";
/// Snapshot removal on the target entity.
pub const METHOD_REMOVE_EVM_SNAPSHOT: &str = "remove_evm_snapshot";
/// Signal enqueued by the initial dispatch.
pub const SIGNAL_START: &str = "start";

const MAX_COMMIT_ATTEMPTS: usize = 3;

/// Outcome of a destroy request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    Destroyed,
    /// Job is in flight; the request was ignored.
    RejectedActive,
    NotFound,
}

/// Owns job lifecycle operations over the shared store and queue.
pub struct JobService {
    pub(crate) jobs: Arc<dyn JobStore>,
    pub(crate) tasks: Arc<dyn TaskStore>,
    pub(crate) queue: Arc<dyn WorkQueue>,
    pub(crate) snapshots: Arc<dyn SnapshotStore>,
    pub(crate) targets: TargetRegistry,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: SupervisorConfig,
}

impl JobService {
    pub fn new(backends: JobBackends, config: SupervisorConfig) -> Self {
        Self {
            jobs: backends.jobs,
            tasks: backends.tasks,
            queue: backends.queue,
            snapshots: backends.snapshots,
            targets: backends.targets,
            clock: backends.clock,
            config,
        }
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    pub fn queue(&self) -> &Arc<dyn WorkQueue> {
        &self.queue
    }

    /// Create a job with its linked task and perform the initial dispatch.
    pub async fn create_job(&self, job_type: &str, options: JobOptions) -> Result<JobRecord> {
        let mut record = JobRecord::new(job_type, options, self.clock.now());
        let task = self
            .tasks
            .insert(TaskRecord::from_attributes(&record.attributes_for_task()))
            .await?;
        record.miq_task_id = Some(task.id);
        let record = self.jobs.insert(record).await?;

        tracing::info!(
            event = SupervisorEvent::JobCreated.as_str(),
            job_id = record.id,
            task_id = task.id,
            "job created: {}",
            record.attributes_log()
        );

        self.dispatch(&record).await?;
        Ok(record)
    }

    async fn dispatch(&self, job: &JobRecord) -> Result<PutOutcome> {
        let request = EnqueueRequest::new(
            JOB_CLASS_NAME,
            Some(job.id),
            METHOD_SIGNAL,
            ROLE_SMARTSTATE,
        )
        .with_args(vec![json!(SIGNAL_START)])
        .with_zone(job.zone.clone());
        let filter = request.live_filter().with_args(request.args.clone());
        let outcome = self.queue.put_unless_exists(request, &filter).await?;
        tracing::debug!(
            event = SupervisorEvent::JobDispatched.as_str(),
            job_guid = %job.guid,
            message_id = outcome.message_id(),
            enqueued = outcome.is_enqueued(),
            "initial job dispatch"
        );
        Ok(outcome)
    }

    pub async fn get_job(&self, id: u64) -> Result<Option<JobRecord>> {
        self.jobs.get(id).await
    }

    pub async fn find_job_by_guid(&self, guid: Uuid) -> Result<Option<JobRecord>> {
        self.jobs.find_by_guid(guid).await
    }

    /// Commit path for every job mutation.
    ///
    /// Re-reads the row, applies `mutate`, and writes with compare-and-swap,
    /// retrying on concurrent modification. `started_on` is stamped on the first
    /// move out of the initial state and never overwritten afterwards. The
    /// linked task is synchronized after the commit. A mutation that changes
    /// nothing is not written.
    pub async fn update_job<F>(&self, id: u64, mut mutate: F) -> Result<JobRecord>
    where
        F: FnMut(&mut JobRecord) + Send,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let current = self.jobs.get(id).await?.ok_or(JobError::NotFound(id))?;
            let mut next = current.clone();
            mutate(&mut next);
            next.id = current.id;
            next.guid = current.guid;
            next.lock_version = current.lock_version;
            next.created_on = current.created_on;

            if next == current {
                return Ok(current);
            }

            let now = self.clock.now();
            if current.started_on.is_some() {
                next.started_on = current.started_on;
            } else if next.started_on.is_none() && next.state != current.state {
                next.started_on = Some(now);
            }
            next.updated_on = now;

            match self.jobs.compare_and_swap(next).await {
                Ok(committed) => {
                    sync_linked_task(self.tasks.as_ref(), &current, &committed).await;
                    return Ok(committed);
                }
                Err(JobError::StaleRecord { id, expected }) if attempt < MAX_COMMIT_ATTEMPTS => {
                    tracing::debug!(
                        event = SupervisorEvent::JobCommitConflict.as_str(),
                        job_id = id,
                        expected_version = expected,
                        attempt,
                        "job changed concurrently; retrying commit"
                    );
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Delete a job unless it is in flight.
    ///
    /// Initial-state and finished jobs are removed together with their queue
    /// messages; the linked task is kept.
    pub async fn destroy_job(&self, id: u64) -> Result<DestroyOutcome> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let Some(current) = self.jobs.get(id).await? else {
                return Ok(DestroyOutcome::NotFound);
            };
            if current.is_active() {
                tracing::warn!(
                    event = SupervisorEvent::JobDestroyRejected.as_str(),
                    job_id = id,
                    state = %current.state,
                    "job is active; refusing to destroy: {}",
                    current.attributes_log()
                );
                return Ok(DestroyOutcome::RejectedActive);
            }

            match self.jobs.delete(id, current.lock_version).await {
                Ok(()) => {
                    // The row is gone either way; leftover messages find no job on delivery.
                    match self.queue.remove_for_instance(JOB_CLASS_NAME, id).await {
                        Ok(removed) => tracing::info!(
                            event = SupervisorEvent::JobDestroyed.as_str(),
                            job_id = id,
                            removed_messages = removed,
                            "job destroyed: {}",
                            current.attributes_log()
                        ),
                        Err(error) => tracing::warn!(
                            event = SupervisorEvent::JobDestroyed.as_str(),
                            job_id = id,
                            error = %error,
                            "job destroyed but its queue messages could not be removed: {}",
                            current.attributes_log()
                        ),
                    }
                    return Ok(DestroyOutcome::Destroyed);
                }
                Err(JobError::StaleRecord { .. }) if attempt < MAX_COMMIT_ATTEMPTS => {}
                Err(JobError::NotFound(_)) => return Ok(DestroyOutcome::NotFound),
                Err(error) => return Err(error),
            }
        }
    }

    /// Resolve the job's polymorphic target.
    pub async fn target_entity(&self, job: &JobRecord) -> Result<Option<TargetEntity>> {
        match &job.target {
            Some(target) => self.targets.resolve(target).await,
            None => Ok(None),
        }
    }

    /// Multiplier on the base timeout for this job's target kind.
    pub fn timeout_adjustment(&self, job: &JobRecord) -> u32 {
        self.config
            .timeout_adjustment(job.target.as_ref().map(|target| target.kind))
    }

    /// Effective inactivity threshold for `job`.
    pub fn timeout_threshold(&self, job: &JobRecord) -> Duration {
        self.config.timeout_threshold(self.timeout_adjustment(job))
    }

    /// Enqueue a timeout (`signal_abort`) message unless one is already live.
    ///
    /// The message is routed to the job's zone, or zone-less for
    /// repository-local jobs. Errored earlier attempts do not block a new one.
    pub async fn timeout(&self, job: &JobRecord) -> Result<PutOutcome> {
        let elapsed = elapsed_between(self.clock.now(), job.updated_on);
        let threshold = self.timeout_threshold(job);
        let message = format!(
            "job timed out after {} seconds of inactivity. Inactivity threshold [{} seconds]",
            elapsed.as_secs(),
            threshold.as_secs()
        );

        let request = EnqueueRequest::new(
            JOB_CLASS_NAME,
            Some(job.id),
            METHOD_SIGNAL_ABORT,
            ROLE_SMARTSTATE,
        )
        .with_args(vec![json!(message), json!(JobStatus::Error.as_str())])
        .with_zone(job.zone.clone());
        let filter = request.live_filter();
        let outcome = self.queue.put_unless_exists(request, &filter).await?;

        match outcome {
            PutOutcome::Enqueued(message_id) => tracing::warn!(
                event = SupervisorEvent::TimeoutQueued.as_str(),
                job_guid = %job.guid,
                message_id,
                zone = ?job.zone,
                "{message}, aborting"
            ),
            PutOutcome::AlreadyQueued(message_id) => tracing::warn!(
                event = SupervisorEvent::TimeoutAlreadyQueued.as_str(),
                job_guid = %job.guid,
                message_id,
                "previous timeout detected for job; skipping"
            ),
        }
        Ok(outcome)
    }

    /// Force a job to `finished` with `status` and `message`.
    ///
    /// Delivery target of the timeout message. A vanished target entity is
    /// logged, not raised; an already finished or deleted job is left alone.
    pub async fn signal_abort(
        &self,
        id: u64,
        message: &str,
        status: JobStatus,
    ) -> Result<Option<JobRecord>> {
        let Some(job) = self.jobs.get(id).await? else {
            tracing::info!(
                event = SupervisorEvent::JobAbortIgnored.as_str(),
                job_id = id,
                "abort for deleted job ignored"
            );
            return Ok(None);
        };
        if job.is_finished() {
            tracing::info!(
                event = SupervisorEvent::JobAbortIgnored.as_str(),
                job_guid = %job.guid,
                "abort for finished job ignored"
            );
            return Ok(Some(job));
        }

        if job.target.is_some() {
            match self.target_entity(&job).await {
                Ok(Some(_)) => {}
                Ok(None) => tracing::warn!(
                    event = SupervisorEvent::JobTargetMissing.as_str(),
                    job_guid = %job.guid,
                    target = ?job.target,
                    "job target no longer exists; finishing job anyway"
                ),
                Err(error) => tracing::warn!(
                    event = SupervisorEvent::JobTargetMissing.as_str(),
                    job_guid = %job.guid,
                    error = %error,
                    "job target lookup failed; finishing job anyway"
                ),
            }
        }

        let mut aborted = false;
        let committed = match self
            .update_job(id, |job| {
                aborted = !job.is_finished();
                if !aborted {
                    return;
                }
                job.state = STATE_FINISHED.to_string();
                job.status = status;
                job.message = message.to_string();
                job.dispatch_status = DispatchStatus::Pending;
            })
            .await
        {
            Ok(committed) => committed,
            Err(JobError::NotFound(_)) => return Ok(None),
            Err(error) => return Err(error),
        };
        if !aborted {
            tracing::info!(
                event = SupervisorEvent::JobAbortIgnored.as_str(),
                job_guid = %committed.guid,
                "job finished concurrently; abort ignored"
            );
            return Ok(Some(committed));
        }

        tracing::warn!(
            event = SupervisorEvent::JobAborted.as_str(),
            job_guid = %committed.guid,
            status = committed.status.as_str(),
            "job aborted: {}",
            committed.message
        );
        Ok(Some(committed))
    }
}
